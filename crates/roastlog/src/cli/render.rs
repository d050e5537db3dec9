//! Plain-text rendering for CLI output.

use std::fmt::Write;

use crate::metrics::ChartPoint;
use crate::record::{PendingSession, Template};
use crate::session::format_clock;
use crate::viewer::{LogListing, LogView};

fn opt<T: std::fmt::Display>(value: Option<T>, unit: &str) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v}{unit}"))
}

fn or_dash(text: &str) -> &str {
    if text.is_empty() {
        "-"
    } else {
        text
    }
}

/// Template table.
#[must_use]
pub fn templates(templates: &[Template]) -> String {
    if templates.is_empty() {
        return "no templates yet; add one with `roastlog template add <name>`\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "{:<20} {:<24} {:<12} {:<12}", "ID", "NAME", "ORIGIN", "PROCESS");
    for t in templates {
        let _ = writeln!(
            out,
            "{:<20} {:<24} {:<12} {:<12}",
            t.id,
            t.name,
            or_dash(&t.origin),
            or_dash(&t.processing_method)
        );
    }
    out
}

/// Pending session details.
#[must_use]
pub fn session(session: &PendingSession) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Bean:         {} ({})", session.template_name, session.template_id);
    let _ = writeln!(out, "Charge:       {} g", session.charge_grams);
    let _ = writeln!(out, "Ambient:      {}", opt(session.ambient_temp, "°C"));
    let _ = writeln!(out, "Humidity:     {}", opt(session.humidity, "%"));
    let _ = writeln!(out, "Roaster:      {}", or_dash(&session.roaster));
    let _ = writeln!(out, "Charge temp:  {}", opt(session.charge_temp, "°C"));
    let _ = writeln!(out, "Memo:         {}", or_dash(&session.memo));
    out
}

/// Saved roast table.
#[must_use]
pub fn log_list(listings: &[LogListing]) -> String {
    if listings.is_empty() {
        return "no saved roasts\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "{:<20} {:<17} {:<24} {:>6} {:>6}", "ID", "DATE", "BEAN", "TIME", "LOSS");
    for l in listings {
        let _ = writeln!(
            out,
            "{:<20} {:<17} {:<24} {:>6} {:>6}",
            l.id,
            l.created_at.format("%Y-%m-%d %H:%M"),
            l.template_name,
            l.total_time,
            opt(l.weight_loss_percent, "%")
        );
    }
    out
}

/// Full view of a saved roast.
#[must_use]
pub fn log_view(view: &LogView) -> String {
    let log = &view.log;
    let s = &view.summary;
    let mut out = String::new();
    let _ = writeln!(out, "{}  ({})", log.session.template_name, log.created_at.format("%Y-%m-%d %H:%M"));
    let _ = writeln!(out);
    let _ = writeln!(out, "Roast time:   {}", s.total_time);
    let _ = writeln!(out, "Charge:       {} g", log.session.charge_grams);
    let _ = writeln!(out, "Discharge:    {}", opt(log.discharge_grams, " g"));
    let _ = writeln!(out, "Weight loss:  {}", opt(s.weight_loss_percent, "%"));
    let _ = writeln!(out, "Roast index:  {}", opt(s.roast_index, ""));
    let _ = writeln!(out, "DTR:          {}", opt(s.development_time_ratio, "%"));
    if let Some(level) = s.roast_level {
        let _ = writeln!(out, "Roast level:  {level} / {}", level.japanese_label());
    }
    let _ = writeln!(out, "RoR (last):   {}", opt(log.last_ror, ""));
    let _ = writeln!(out, "RoR (dry):    {}", opt(log.pre_ror, ""));
    let _ = writeln!(out, "Ambient:      {}", opt(log.session.ambient_temp, "°C"));
    let _ = writeln!(out, "Humidity:     {}", opt(log.session.humidity, "%"));
    let _ = writeln!(out, "Roaster:      {}", or_dash(&log.session.roaster));
    let _ = writeln!(out, "Charge temp:  {}", opt(log.session.charge_temp, "°C"));
    let _ = writeln!(out, "Gas:          {}", or_dash(&log.notes.gas_pressure));
    let _ = writeln!(out, "Damper:       {}", or_dash(&log.notes.damper));
    let _ = writeln!(out, "Middle point: {}", or_dash(&log.notes.middle_point));
    let _ = writeln!(out, "Memo:         {}", or_dash(&log.session.memo));
    let _ = writeln!(out, "Roast memo:   {}", or_dash(&log.roast_memo));
    let _ = writeln!(out);
    let _ = writeln!(out, "{:>6}  {:<22} {:>8} {:>8}", "TIME", "EVENT", "TEMP", "ROR");
    for e in &log.events {
        let _ = writeln!(
            out,
            "{:>6}  {:<22} {:>8} {:>8}",
            format_clock(e.elapsed),
            e.kind.to_string(),
            opt(e.temperature, ""),
            opt(e.ror, "")
        );
    }
    out
}

/// Chart series as a table.
#[must_use]
pub fn chart(points: &[ChartPoint]) -> String {
    if points.is_empty() {
        return "no temperature data\n".to_string();
    }
    let mut out = String::new();
    let _ = writeln!(out, "{:>6} {:>8} {:>8}  MARKER", "TIME", "TEMP", "ROR");
    for p in points {
        let marker = p.marker.map(|k| k.to_string()).unwrap_or_default();
        let _ = writeln!(
            out,
            "{:>6} {:>8} {:>8}  {marker}",
            p.time,
            opt(p.temperature, ""),
            opt(p.ror, "")
        );
    }
    out
}
