use std::fmt;

use lightlvl_world::LightChannel;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::color::Rgba;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Comparison {
    /// level >= threshold
    Over,
    /// level < threshold
    Under,
}

impl Comparison {
    pub fn parse(token: &str) -> Option<Comparison> {
        let token = token.trim();
        if token.eq_ignore_ascii_case("over") {
            Some(Comparison::Over)
        } else if token.eq_ignore_ascii_case("under") {
            Some(Comparison::Under)
        } else {
            None
        }
    }

    #[inline]
    pub fn matches(self, level: u8, threshold: u8) -> bool {
        match self {
            Comparison::Over => level >= threshold,
            Comparison::Under => level < threshold,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Comparison::Over => "Over",
            Comparison::Under => "Under",
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rule {
    pub channel: LightChannel,
    pub comparison: Comparison,
    pub threshold: u8,
    pub color: Rgba,
}

impl Rule {
    pub const fn new(channel: LightChannel, comparison: Comparison, threshold: u8, color: Rgba) -> Self {
        Self {
            channel,
            comparison,
            threshold,
            color,
        }
    }

    #[inline]
    pub fn matches(&self, level: u8) -> bool {
        self.comparison.matches(level, self.threshold)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleError {
    #[error("rule {index}: light type '{token}' is not 'Block' or 'Sun'")]
    UnknownChannel { index: usize, token: String },
    #[error("rule {index}: over_or_under '{token}' is not 'Over' or 'Under'")]
    UnknownComparison { index: usize, token: String },
}

/// Ordered rules; the first match wins and no match means transparent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self { rules }
    }

    /// Validates persisted rule definitions. One bad token rejects the whole set.
    pub fn compile(defs: &[RuleDef]) -> Result<RuleSet, RuleError> {
        let rules = defs
            .iter()
            .enumerate()
            .map(|(index, def)| def.compile(index))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(RuleSet { rules })
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Levels are fetched lazily per rule; a channel may be asked for more than once.
    pub fn evaluate_with<E>(
        &self,
        mut level: impl FnMut(LightChannel) -> Result<u8, E>,
    ) -> Result<Rgba, E> {
        for rule in &self.rules {
            if rule.matches(level(rule.channel)?) {
                return Ok(rule.color);
            }
        }
        Ok(Rgba::TRANSPARENT)
    }

    /// Same as [`RuleSet::evaluate_with`] with both levels already known.
    pub fn evaluate(&self, block: u8, sun: u8) -> Rgba {
        let r: Result<Rgba, std::convert::Infallible> = self.evaluate_with(|c| {
            Ok(match c {
                LightChannel::Block => block,
                LightChannel::Sun => sun,
            })
        });
        match r {
            Ok(c) => c,
            Err(never) => match never {},
        }
    }
}

/// Rule as written in the config file. Tokens are kept raw so a typo can be
/// reported against its rule index instead of failing the whole file.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleDef {
    pub light_type: String,
    pub over_or_under: String,
    pub light_level: u8,
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub opacity: u8,
}

impl RuleDef {
    pub fn compile(&self, index: usize) -> Result<Rule, RuleError> {
        let channel =
            LightChannel::parse(&self.light_type).ok_or_else(|| RuleError::UnknownChannel {
                index,
                token: self.light_type.clone(),
            })?;
        let comparison = Comparison::parse(&self.over_or_under).ok_or_else(|| {
            RuleError::UnknownComparison {
                index,
                token: self.over_or_under.clone(),
            }
        })?;
        Ok(Rule {
            channel,
            comparison,
            threshold: self.light_level,
            color: Rgba::new(self.red, self.green, self.blue, self.opacity),
        })
    }

    pub fn from_rule(rule: &Rule) -> Self {
        Self {
            light_type: rule.channel.as_str().to_string(),
            over_or_under: rule.comparison.as_str().to_string(),
            light_level: rule.threshold,
            red: rule.color.r,
            green: rule.color.g,
            blue: rule.color.b,
            opacity: rule.color.a,
        }
    }

    /// Green when torch-lit, yellow when only sun-lit, red when dark.
    pub fn example_set() -> Vec<RuleDef> {
        [
            Rule::new(LightChannel::Block, Comparison::Over, 8, Rgba::new(0, 255, 0, 32)),
            Rule::new(LightChannel::Sun, Comparison::Over, 8, Rgba::new(255, 255, 0, 32)),
            Rule::new(LightChannel::Sun, Comparison::Under, 8, Rgba::new(255, 0, 0, 32)),
        ]
        .iter()
        .map(RuleDef::from_rule)
        .collect()
    }
}
