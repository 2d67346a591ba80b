use schema_canvas::config::RankDir;
use schema_canvas::sketch::LineType;
use schema_canvas::{Config, build_canvas, parse_model};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LayoutOptions {
    line: Option<LineType>,
    rankdir: Option<RankDir>,
    nodesep: Option<f32>,
    ranksep: Option<f32>,
    growth_margin: Option<f32>,
}

fn build_config(options: LayoutOptions) -> Config {
    let mut config = Config::default();
    if let Some(line) = options.line {
        config.sketch.line_type = line;
    }
    if let Some(rankdir) = options.rankdir {
        config.layout.rankdir = rankdir;
    }
    if let Some(nodesep) = options.nodesep {
        config.layout.nodesep = nodesep;
    }
    if let Some(ranksep) = options.ranksep {
        config.layout.ranksep = ranksep;
    }
    if let Some(margin) = options.growth_margin {
        config.canvas.growth_margin = margin;
    }
    config
}

fn layout_to_json(model_json: &str, options: LayoutOptions) -> Result<String, String> {
    let model = parse_model(model_json).map_err(|error| error.to_string())?;
    let snapshot = build_canvas(&model, &build_config(options)).map_err(|error| error.to_string())?;
    snapshot.dump().to_json().map_err(|error| error.to_string())
}

/// Lay out a data model and return the diagram snapshot as JSON.
#[wasm_bindgen]
pub fn layout_model(model_json: &str, options_json: Option<String>) -> Result<String, JsValue> {
    let options = if let Some(raw_options) = options_json {
        serde_json::from_str::<LayoutOptions>(&raw_options)
            .map_err(|error| JsValue::from_str(&error.to_string()))?
    } else {
        LayoutOptions::default()
    };

    layout_to_json(model_json, options).map_err(|error| JsValue::from_str(&error))
}
