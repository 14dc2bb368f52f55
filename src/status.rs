use serde::Serialize;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tone {
    Success,
    Warning,
    Danger,
    Info,
    Accent,
    Neutral,
}

impl Tone {
    pub fn css_class(self) -> &'static str {
        match self {
            Tone::Success => "badge badge--success",
            Tone::Warning => "badge badge--warning",
            Tone::Danger => "badge badge--danger",
            Tone::Info => "badge badge--info",
            Tone::Accent => "badge badge--accent",
            Tone::Neutral => "badge",
        }
    }
}

/// Status value to badge tone. Lookups ignore case and `-`/`_`/space differences.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusPalette {
    entries: Vec<(String, Tone)>,
    fallback: Tone,
}

fn normalize(status: &str) -> String {
    status
        .trim()
        .to_ascii_lowercase()
        .replace(['-', ' '], "_")
}

impl StatusPalette {
    pub fn new(entries: &[(&str, Tone)]) -> Self {
        Self {
            entries: entries
                .iter()
                .map(|(status, tone)| (normalize(status), *tone))
                .collect(),
            fallback: Tone::Neutral,
        }
    }

    pub fn with_fallback(mut self, tone: Tone) -> Self {
        self.fallback = tone;
        self
    }

    pub fn tone_for(&self, status: &str) -> Tone {
        let key = normalize(status);
        self.entries
            .iter()
            .find(|(candidate, _)| *candidate == key)
            .map(|(_, tone)| *tone)
            .unwrap_or(self.fallback)
    }

    pub fn campaign() -> Self {
        Self::new(&[
            ("active", Tone::Success),
            ("running", Tone::Success),
            ("sent", Tone::Info),
            ("completed", Tone::Info),
            ("scheduled", Tone::Accent),
            ("draft", Tone::Neutral),
            ("paused", Tone::Warning),
            ("failed", Tone::Danger),
            ("archived", Tone::Neutral),
        ])
    }

    pub fn order() -> Self {
        Self::new(&[
            ("pending", Tone::Warning),
            ("processing", Tone::Info),
            ("shipped", Tone::Accent),
            ("out_for_delivery", Tone::Accent),
            ("delivered", Tone::Success),
            ("cancelled", Tone::Danger),
            ("returned", Tone::Danger),
        ])
    }

    pub fn payment() -> Self {
        Self::new(&[
            ("completed", Tone::Success),
            ("succeeded", Tone::Success),
            ("pending", Tone::Warning),
            ("failed", Tone::Danger),
            ("refunded", Tone::Info),
            ("partially_refunded", Tone::Accent),
            ("enabled", Tone::Success),
            ("disabled", Tone::Neutral),
            ("connected", Tone::Success),
            ("disconnected", Tone::Danger),
        ])
    }

    pub fn priority() -> Self {
        Self::new(&[
            ("urgent", Tone::Danger),
            ("high", Tone::Warning),
            ("medium", Tone::Info),
            ("low", Tone::Neutral),
        ])
    }

    pub fn lifecycle() -> Self {
        Self::new(&[
            ("active", Tone::Success),
            ("enabled", Tone::Success),
            ("published", Tone::Success),
            ("open", Tone::Success),
            ("waiting", Tone::Warning),
            ("processing", Tone::Info),
            ("queued", Tone::Info),
            ("draft", Tone::Neutral),
            ("inactive", Tone::Neutral),
            ("disabled", Tone::Neutral),
            ("closed", Tone::Neutral),
            ("failed", Tone::Danger),
            ("expired", Tone::Danger),
        ])
    }

    pub fn tier() -> Self {
        Self::new(&[
            ("platinum", Tone::Accent),
            ("gold", Tone::Warning),
            ("vip", Tone::Accent),
            ("silver", Tone::Info),
            ("bronze", Tone::Neutral),
            ("new", Tone::Info),
        ])
    }
}

impl Default for StatusPalette {
    fn default() -> Self {
        Self::lifecycle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookups_ignore_case_and_separators() {
        let palette = StatusPalette::order();
        assert_eq!(palette.tone_for("Out-For-Delivery"), Tone::Accent);
        assert_eq!(palette.tone_for("DELIVERED"), Tone::Success);
    }

    #[test]
    fn unknown_statuses_use_fallback() {
        assert_eq!(StatusPalette::campaign().tone_for("mystery"), Tone::Neutral);
        let palette = StatusPalette::priority().with_fallback(Tone::Info);
        assert_eq!(palette.tone_for(""), Tone::Info);
    }
}
