use anyhow::{bail, Result};
use serde_json::{to_value, Value};
use stock_core::settings::Command;
use stock_data::InventoryEngine;

/// Run one query against `engine` and return its JSON output.
pub fn run_query(engine: &InventoryEngine, command: &Command) -> Result<Value> {
    let value = match command {
        Command::Stats => to_value(engine.dashboard_stats())?,
        Command::Sites => to_value(engine.site_summary())?,
        Command::Shortages { percentile } => to_value(engine.shortage_items(*percentile))?,
        Command::Critical { multiplier } => to_value(engine.critical_items(*multiplier))?,
        Command::Abundant { percentile } => to_value(engine.abundant_items(*percentile))?,
        Command::Shipping => to_value(engine.shipping_recommendations())?,
        Command::Movements => to_value(engine.movement_recommendations())?,
        Command::Site { site } => to_value(engine.site_inventory(Some(site.as_str())))?,
        Command::Material { material } => to_value(engine.material_analysis(Some(material.as_str())))?,
        Command::Details { material } => to_value(engine.material_details(material))?,
        Command::Inventory => to_value(engine.site_inventory(None))?,
        Command::Bottlenecks => to_value(engine.bottleneck_analysis())?,
        Command::Focus => to_value(engine.focus_areas())?,
        Command::TopShortages { limit } => to_value(engine.top_shortages_by_value(*limit))?,
        Command::Inactive { days, limit } => to_value(engine.inactive_stock(*days, *limit))?,
        Command::Watch { .. } => bail!("`watch` is not a one-shot query"),
    };
    Ok(value)
}

/// Serialise query output for stdout.
pub fn render(value: &Value, pretty: bool) -> Result<String> {
    let text = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    Ok(text)
}
