//! Chat command parser.
//!
//! Maps the text of a bot mention to a [`Command`]. Matching is
//! case-insensitive and first-match over an ordered trigger list, so a
//! message containing several triggers resolves to the earliest entry.

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Summarize,
    /// `country` is the single token following `impact`, if any.
    TariffImpact { country: Option<String> },
    ShippingRisk,
    Help,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CommandKind {
    Summarize,
    TariffImpact,
    ShippingRisk,
    Help,
}

/// Trigger phrases in priority order.
const TRIGGERS: &[(&str, CommandKind)] = &[
    ("summarize", CommandKind::Summarize),
    ("tariff impact", CommandKind::TariffImpact),
    ("shipping risk", CommandKind::ShippingRisk),
    ("help", CommandKind::Help),
];

/// Token that precedes the country argument.
const ARGUMENT_MARKER: &str = "impact";

/// Rule-based parser for bot mentions.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandParser;

impl CommandParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse mention text into a command.
    pub fn parse(&self, text: &str) -> Command {
        let text = text.to_lowercase();

        let kind = TRIGGERS
            .iter()
            .find(|(phrase, _)| text.contains(phrase))
            .map(|(_, kind)| *kind);

        match kind {
            Some(CommandKind::Summarize) => Command::Summarize,
            Some(CommandKind::TariffImpact) => Command::TariffImpact {
                country: argument_after(&text, ARGUMENT_MARKER),
            },
            Some(CommandKind::ShippingRisk) => Command::ShippingRisk,
            Some(CommandKind::Help) => Command::Help,
            None => Command::Unknown,
        }
    }
}

/// The whitespace-separated token right after the first `marker` token.
fn argument_after(text: &str, marker: &str) -> Option<String> {
    let mut tokens = text.split_whitespace();
    tokens.find(|t| *t == marker)?;
    tokens.next().map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Command {
        CommandParser::new().parse(text)
    }

    #[test]
    fn test_tariff_impact_with_country() {
        assert_eq!(
            parse("<@U123> tariff impact china"),
            Command::TariffImpact {
                country: Some("china".to_string())
            }
        );
    }

    #[test]
    fn test_country_is_lowercased() {
        assert_eq!(
            parse("@gts-ws Tariff Impact MEXICO please"),
            Command::TariffImpact {
                country: Some("mexico".to_string())
            }
        );
    }

    #[test]
    fn test_tariff_impact_without_country() {
        assert_eq!(
            parse("@gts-ws tariff impact"),
            Command::TariffImpact { country: None }
        );
    }

    #[test]
    fn test_tariff_impact_marker_not_a_token() {
        // Trigger matches as a substring but "impact" is never a whole token.
        assert_eq!(
            parse("@gts-ws tariff impacts"),
            Command::TariffImpact { country: None }
        );
    }

    #[test]
    fn test_multi_word_country_takes_first_token() {
        assert_eq!(
            parse("@gts-ws tariff impact united states"),
            Command::TariffImpact {
                country: Some("united".to_string())
            }
        );
    }

    #[test]
    fn test_first_trigger_wins() {
        assert_eq!(parse("@gts-ws summarize help"), Command::Summarize);
        assert_eq!(parse("help with tariff impact china"), Command::TariffImpact {
            country: Some("china".to_string())
        });
        assert_eq!(parse("shipping risk help"), Command::ShippingRisk);
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse("@gts-ws SUMMARIZE"), Command::Summarize);
        assert_eq!(parse("@gts-ws shipping risk"), Command::ShippingRisk);
        assert_eq!(parse("@gts-ws help"), Command::Help);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(parse("@gts-ws hello there"), Command::Unknown);
        assert_eq!(parse(""), Command::Unknown);
    }
}
