//! Argument parsing helpers shared by the commands.

use subsynth::SynthParam;

/// Parse a `key=value` string for clap's `value_parser`.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => Err(format!(
            "Invalid parameter format: '{}' (expected key=value)",
            s
        )),
    }
}

/// Parse a comma-separated list of MIDI note numbers, e.g. `"60,64,67"`.
pub fn parse_notes(s: &str) -> anyhow::Result<Vec<u8>> {
    let notes = s
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(|n| {
            let note: u8 = n
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid MIDI note '{}'", n))?;
            if note > 127 {
                anyhow::bail!("MIDI note {} out of range (0-127)", note);
            }
            Ok(note)
        })
        .collect::<anyhow::Result<Vec<u8>>>()?;

    if notes.is_empty() {
        anyhow::bail!("No MIDI notes provided. Use format: --notes \"60,64,67\"");
    }
    Ok(notes)
}

/// Resolve a `--param` override into a parameter and plain value.
///
/// The value is either a number or, for enumerated parameters, one of the
/// descriptor's labels (case-insensitive), e.g. `osc1_type=square`.
pub fn parse_param_value(id: &str, raw: &str) -> anyhow::Result<(SynthParam, f32)> {
    let param = SynthParam::from_string_id(id).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown parameter '{}'. Use 'subsynth params' to list parameters.",
            id
        )
    })?;

    if let Ok(value) = raw.parse::<f32>() {
        if !value.is_finite() {
            anyhow::bail!("Value for '{}' must be finite", id);
        }
        return Ok((param, value));
    }

    let desc = param.descriptor();
    desc.labels
        .iter()
        .position(|label| label.eq_ignore_ascii_case(raw))
        .map(|idx| (param, idx as f32))
        .ok_or_else(|| {
            if desc.labels.is_empty() {
                anyhow::anyhow!("Invalid value '{}' for '{}'", raw, id)
            } else {
                anyhow::anyhow!(
                    "Invalid value '{}' for '{}' (expected a number or one of: {})",
                    raw,
                    id,
                    desc.labels.join(", ")
                )
            }
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_val_splits_on_first_equals() {
        assert_eq!(
            parse_key_val("filter_cutoff=2000").unwrap(),
            ("filter_cutoff".to_string(), "2000".to_string())
        );
        assert_eq!(parse_key_val("a=b=c").unwrap().1, "b=c");
        assert!(parse_key_val("cutoff").is_err());
        assert!(parse_key_val("=5").is_err());
    }

    #[test]
    fn notes_parse_and_validate() {
        assert_eq!(parse_notes("60, 64,67").unwrap(), vec![60, 64, 67]);
        assert!(parse_notes("").is_err());
        assert!(parse_notes("60,x").is_err());
        assert!(parse_notes("128").is_err());
    }

    #[test]
    fn param_value_accepts_numbers_and_labels() {
        assert_eq!(
            parse_param_value("filter_cutoff", "1500").unwrap(),
            (SynthParam::FilterCutoff, 1500.0)
        );
        assert_eq!(
            parse_param_value("osc1_type", "square").unwrap(),
            (SynthParam::Osc1Type, 2.0)
        );
        assert_eq!(
            parse_param_value("filter_mode", "HPF12").unwrap(),
            (SynthParam::FilterMode, 1.0)
        );
        assert_eq!(
            parse_param_value("filter_enabled", "off").unwrap(),
            (SynthParam::FilterEnabled, 0.0)
        );
    }

    #[test]
    fn param_value_rejects_unknowns() {
        assert!(parse_param_value("detune", "5").is_err());
        assert!(parse_param_value("osc1_type", "noise").is_err());
        assert!(parse_param_value("sustain", "loud").is_err());
        assert!(parse_param_value("sustain", "NaN").is_err());
    }
}
