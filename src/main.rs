fn main() {
    if let Err(err) = schema_canvas::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
