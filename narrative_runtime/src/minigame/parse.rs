//! Minigame tag parsing.
//!
//! Two tag shapes are understood:
//! - legacy, colon separated: `minigame:qte:SPACE:1.5`
//! - key=value pairs: `minigame: type=lockpick, speed={agility}, autostart=false`
//!
//! `{name}` placeholders in key=value tags are resolved through the story's
//! variables; unresolved placeholders are left as written.

use super::{MinigameConfig, MinigameParam};
use crate::interpreter::VariableValue;

const PREFIX: &str = "minigame:";

/// Parse a minigame tag, or `None` if the tag is not a usable minigame tag.
pub fn parse_minigame_tag<F>(tag: &str, resolve: F) -> Option<MinigameConfig>
where
    F: Fn(&str) -> Option<VariableValue>,
{
    let tag = tag.trim();
    let prefix = tag.get(..PREFIX.len())?;
    if !prefix.eq_ignore_ascii_case(PREFIX) {
        return None;
    }
    let content = tag[PREFIX.len()..].trim();

    if content.contains('=') {
        parse_pairs(content, &resolve)
    } else {
        parse_legacy(content)
    }
}

fn parse_pairs<F>(content: &str, resolve: &F) -> Option<MinigameConfig>
where
    F: Fn(&str) -> Option<VariableValue>,
{
    let mut config = MinigameConfig::new("");

    for pair in content.split(',') {
        let mut parts = pair.splitn(2, '=');
        let key = parts.next().unwrap_or_default().trim();
        let Some(raw) = parts.next() else {
            continue;
        };
        let value = resolve_placeholders(raw.trim(), resolve);

        match key {
            "type" => config.kind = value.to_lowercase(),
            "autostart" => config.auto_start = value.eq_ignore_ascii_case("true"),
            "onFail" | "onSuccess" => {
                config.params.insert(key.to_string(), MinigameParam::Text(value));
            }
            "consume" => {
                config
                    .params
                    .insert("consumeItem".to_string(), MinigameParam::Text(value));
            }
            _ => {
                let param = match value.parse::<f64>() {
                    Ok(n) if n.is_finite() => MinigameParam::Number(n),
                    _ => MinigameParam::Text(value),
                };
                config.params.insert(key.to_string(), param);
            }
        }
    }

    if config.kind.is_empty() {
        None
    } else {
        Some(config)
    }
}

fn parse_legacy(content: &str) -> Option<MinigameConfig> {
    let parts: Vec<&str> = content.split(':').map(str::trim).collect();
    let kind = parts.first().copied().unwrap_or_default().to_lowercase();
    if kind.is_empty() {
        return None;
    }

    let text_at = |i: usize| parts.get(i).copied().filter(|s| !s.is_empty());
    let number_at = |i: usize, default: f64| {
        text_at(i)
            .and_then(|s| s.parse::<f64>().ok())
            .filter(|n| *n != 0.0 && n.is_finite())
            .unwrap_or(default)
    };

    let mut config = MinigameConfig::new(kind);
    match config.kind.as_str() {
        "qte" => {
            let key = text_at(1).unwrap_or("SPACE").to_string();
            config = config
                .with_param("key", MinigameParam::Text(key))
                .with_param("timeout", MinigameParam::Number(number_at(2, 2.0)));
        }
        "lockpick" => {
            config = config
                .with_param("zoneSize", MinigameParam::Number(number_at(1, 0.15)))
                .with_param("speed", MinigameParam::Number(number_at(2, 1.5)));
        }
        _ => {}
    }

    Some(config)
}

/// Replace `{name}` with the variable's value where it resolves.
fn resolve_placeholders<F>(value: &str, resolve: &F) -> String
where
    F: Fn(&str) -> Option<VariableValue>,
{
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(open) = rest.find('{') {
        let Some(close) = rest[open..].find('}').map(|i| open + i) else {
            break;
        };
        out.push_str(&rest[..open]);

        let name = rest[open + 1..close].trim();
        match resolve(name) {
            Some(resolved) => {
                log::debug!("Resolved {{{}}} = {}", name, resolved);
                out.push_str(&resolved.to_string());
            }
            None => out.push_str(&rest[open..=close]),
        }
        rest = &rest[close + 1..];
    }

    out.push_str(rest);
    out
}
