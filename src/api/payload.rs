// Legacy payload and query parsing
//
// Legacy clients are loose about types: `channel` may be a string or a
// number and `value` may be "on"/"off", a bool, a number or a numeric string.
// Everything is normalised into a LegacyRequest or SearchFilters here, before
// the translator sees it.

use crate::catalogue::SearchFilters;
use crate::command::{ChannelSelector, LegacyRequest, TranslatorError, TranslatorResult};
use serde::Deserialize;

/// Body of `PUT /device/{slot}`
#[derive(Debug, Clone, Deserialize)]
pub struct DevicePayload {
    pub command: String,
    pub channel: Option<ChannelField>,
    pub value: Option<ValueField>,
    pub id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ChannelField {
    Number(i64),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ValueField {
    Flag(bool),
    Number(f64),
    Text(String),
}

impl ChannelField {
    fn selector(&self) -> TranslatorResult<ChannelSelector> {
        let parsed = match self {
            ChannelField::Number(n) => ChannelSelector::from_number(*n),
            ChannelField::Text(s) => ChannelSelector::parse(s),
        };
        parsed.ok_or_else(|| TranslatorError::InvalidValue {
            field: "channel",
            reason: format!("{:?} is not 0, 1, 2 or master", self),
        })
    }
}

impl ValueField {
    fn as_switch(&self) -> TranslatorResult<bool> {
        match self {
            ValueField::Flag(flag) => Ok(*flag),
            ValueField::Text(s) if s.eq_ignore_ascii_case("on") => Ok(true),
            ValueField::Text(s) if s.eq_ignore_ascii_case("off") => Ok(false),
            other => Err(TranslatorError::InvalidValue {
                field: "value",
                reason: format!("{:?} is not on or off", other),
            }),
        }
    }

    fn as_gain(&self) -> TranslatorResult<f64> {
        match self {
            ValueField::Number(n) => Ok(*n),
            ValueField::Text(s) => s.trim().parse().map_err(|_| TranslatorError::InvalidValue {
                field: "value",
                reason: format!("{:?} is not a number", s),
            }),
            ValueField::Flag(flag) => Err(TranslatorError::InvalidValue {
                field: "value",
                reason: format!("{} is not a number", flag),
            }),
        }
    }
}

impl DevicePayload {
    /// Turn the payload into a typed request for `slot`
    pub fn into_request(self, slot: i64) -> TranslatorResult<LegacyRequest> {
        match self.command.to_ascii_lowercase().as_str() {
            "mute" => Ok(LegacyRequest::Mute {
                slot,
                channel: self.channel()?,
                on: self.value()?.as_switch()?,
            }),
            "gain" => Ok(LegacyRequest::Gain {
                slot,
                channel: self.channel()?,
                value: self.value()?.as_gain()?,
            }),
            "activate" => Ok(LegacyRequest::Activate { slot }),
            "load" => Ok(LegacyRequest::Load {
                slot,
                preset_id: self.id.ok_or(TranslatorError::MissingField("id"))?,
            }),
            other => Err(TranslatorError::InvalidValue {
                field: "command",
                reason: format!("unknown command {:?}", other),
            }),
        }
    }

    fn channel(&self) -> TranslatorResult<ChannelSelector> {
        self.channel
            .as_ref()
            .ok_or(TranslatorError::MissingField("channel"))?
            .selector()
    }

    fn value(&self) -> TranslatorResult<&ValueField> {
        self.value.as_ref().ok_or(TranslatorError::MissingField("value"))
    }
}

/// Errors in search query parameters
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid query parameter {name}: {value:?}")]
pub struct QueryError {
    pub name: String,
    pub value: String,
}

/// Build search filters from decoded query pairs
///
/// Blank values are ignored; `authors` may be comma separated and repeated.
pub fn search_filters(query: &[(String, String)]) -> Result<SearchFilters, QueryError> {
    let mut filters = SearchFilters::default();

    for (name, value) in query {
        let value = value.trim();
        if value.is_empty() {
            continue;
        }
        match name.to_ascii_lowercase().as_str() {
            "authors" => filters.authors.extend(
                value
                    .split(',')
                    .map(str::trim)
                    .filter(|a| !a.is_empty())
                    .map(str::to_string),
            ),
            "title" => filters.title = Some(value.to_string()),
            "year" => {
                let year = value.parse().map_err(|_| QueryError {
                    name: name.clone(),
                    value: value.to_string(),
                })?;
                filters.year = Some(year);
            }
            "audiotype" | "audiotypes" => filters.audio_type = Some(value.to_string()),
            "contenttype" | "contenttypes" => filters.content_type = Some(value.to_string()),
            _ => log::debug!("Ignoring unknown search parameter {}", name),
        }
    }

    Ok(filters)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::InputSelection;
    use crate::device::InputIndex;

    fn parse(json: &str, slot: i64) -> TranslatorResult<LegacyRequest> {
        let payload: DevicePayload = serde_json::from_str(json).unwrap();
        payload.into_request(slot)
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_mute_payloads() {
        assert_eq!(
            parse(r#"{"command": "mute", "channel": "0", "value": "on"}"#, 2).unwrap(),
            LegacyRequest::Mute {
                slot: 2,
                channel: ChannelSelector::Inputs(InputSelection::Both),
                on: true,
            }
        );
        assert_eq!(
            parse(r#"{"command": "mute", "channel": "master", "value": false}"#, 0).unwrap(),
            LegacyRequest::Mute {
                slot: 0,
                channel: ChannelSelector::Master,
                on: false,
            }
        );
        assert!(matches!(
            parse(r#"{"command": "mute", "channel": "1", "value": "maybe"}"#, 1),
            Err(TranslatorError::InvalidValue { field: "value", .. })
        ));
    }

    #[test]
    fn test_gain_payloads() {
        assert_eq!(
            parse(r#"{"command": "gain", "channel": 2, "value": -14.2}"#, 4).unwrap(),
            LegacyRequest::Gain {
                slot: 4,
                channel: ChannelSelector::Inputs(InputSelection::One(InputIndex::SECOND)),
                value: -14.2,
            }
        );
        assert_eq!(
            parse(r#"{"command": "gain", "channel": "master", "value": "-3.5"}"#, 0).unwrap(),
            LegacyRequest::Gain {
                slot: 0,
                channel: ChannelSelector::Master,
                value: -3.5,
            }
        );
        assert!(matches!(
            parse(r#"{"command": "gain", "channel": "0", "value": 5}"#, 1),
            Ok(LegacyRequest::Gain { value, .. }) if value == 5.0
        ));
        assert!(matches!(
            parse(r#"{"command": "gain", "channel": "0"}"#, 1),
            Err(TranslatorError::MissingField("value"))
        ));
        assert!(matches!(
            parse(r#"{"command": "gain", "channel": "7", "value": 1.0}"#, 1),
            Err(TranslatorError::InvalidValue { field: "channel", .. })
        ));
    }

    #[test]
    fn test_activate_and_load_payloads() {
        assert_eq!(
            parse(r#"{"command": "activate"}"#, 3).unwrap(),
            LegacyRequest::Activate { slot: 3 }
        );
        assert_eq!(
            parse(r#"{"command": "load", "id": "123456_0"}"#, 1).unwrap(),
            LegacyRequest::Load {
                slot: 1,
                preset_id: "123456_0".to_string(),
            }
        );
        assert!(matches!(
            parse(r#"{"command": "load"}"#, 1),
            Err(TranslatorError::MissingField("id"))
        ));
        assert!(matches!(
            parse(r#"{"command": "reboot"}"#, 1),
            Err(TranslatorError::InvalidValue { field: "command", .. })
        ));
    }

    #[test]
    fn test_search_filters_from_query() {
        let filters = search_filters(&pairs(&[
            ("authors", "aron7awol, halcyon888"),
            ("authors", "mobe1969"),
            ("title", "alien"),
            ("year", "1997"),
            ("audiotype", ""),
            ("contenttype", "film"),
        ]))
        .unwrap();

        assert_eq!(filters.authors, vec!["aron7awol", "halcyon888", "mobe1969"]);
        assert_eq!(filters.title.as_deref(), Some("alien"));
        assert_eq!(filters.year, Some(1997));
        assert_eq!(filters.audio_type, None);
        assert_eq!(filters.content_type.as_deref(), Some("film"));

        assert!(search_filters(&[]).unwrap().is_empty());
        assert!(search_filters(&pairs(&[("year", "last")])).is_err());
    }
}
