//! Narrative token substitution.
//!
//! Trait and proc texts carry `{{token}}` placeholders. A token is either a
//! stat key in joined form (`str`, `hitDice`, `attacks__bite__reach`),
//! `proficiency`, or a save DC of the form `DC:<ability>`, which evaluates
//! to `8 + proficiency + mod(ability)`. Anything else is an error rather
//! than an empty substitution.

use crate::derived::DerivedStatblock;
use crate::error::ScaleError;
use crate::path::StatPath;
use crate::statblock::Ability;

const OPEN: &str = "{{";
const CLOSE: &str = "}}";

/// A parsed placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Stat(StatPath),
    Proficiency,
    SaveDc(Ability),
}

impl Token {
    /// Parse the text between the braces.
    pub fn parse(token: &str) -> Result<Self, ScaleError> {
        let unknown = || ScaleError::UnknownToken(token.to_string());
        if token == "proficiency" {
            return Ok(Token::Proficiency);
        }
        if let Some(ability) = token.strip_prefix("DC:") {
            return ability
                .trim()
                .parse()
                .map(Token::SaveDc)
                .map_err(|_| unknown());
        }
        token.parse().map(Token::Stat).map_err(|_| unknown())
    }

    /// Evaluate against a derived statblock.
    pub fn evaluate(&self, statblock: &DerivedStatblock) -> Result<i64, ScaleError> {
        match self {
            Token::Stat(path) => statblock
                .lookup(path)
                .map(|value| value as i64)
                .ok_or_else(|| ScaleError::UnresolvedToken(path.to_string())),
            Token::Proficiency => Ok(i64::from(statblock.proficiency)),
            Token::SaveDc(ability) => Ok(i64::from(
                8 + statblock.proficiency + statblock.ability_modifiers.get(*ability),
            )),
        }
    }
}

/// Replace every `{{token}}` in `text` with its value.
///
/// # Errors
///
/// - [`ScaleError::MalformedText`] for an unterminated or empty placeholder.
/// - [`ScaleError::UnknownToken`] for a token outside the grammar.
/// - [`ScaleError::UnresolvedToken`] for a stat the statblock lacks.
pub fn render_text(text: &str, statblock: &DerivedStatblock) -> Result<String, ScaleError> {
    let mut output = String::with_capacity(text.len());
    let mut rest = text;
    let mut offset = 0;

    while let Some(start) = rest.find(OPEN) {
        output.push_str(&rest[..start]);
        let inner = &rest[start + OPEN.len()..];
        let end = inner.find(CLOSE).ok_or_else(|| ScaleError::MalformedText {
            position: offset + start,
            reason: "unterminated placeholder".to_string(),
        })?;
        let token = inner[..end].trim();
        if token.is_empty() {
            return Err(ScaleError::MalformedText {
                position: offset + start,
                reason: "empty placeholder".to_string(),
            });
        }

        let value = Token::parse(token)?.evaluate(statblock)?;
        output.push_str(&value.to_string());

        let consumed = start + OPEN.len() + end + CLOSE.len();
        rest = &rest[consumed..];
        offset += consumed;
    }
    output.push_str(rest);
    Ok(output)
}
