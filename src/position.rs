use std::fmt;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionCounts {
    counts: Vec<(String, u32)>,
}

impl PositionCounts {
    pub fn record(&mut self, raw: &str) {
        for code in raw.split(',').map(str::trim).filter(|c| !c.is_empty()) {
            self.increment(code, 1);
        }
    }

    pub fn increment(&mut self, code: &str, by: u32) {
        match self.counts.iter_mut().find(|(c, _)| c == code) {
            Some((_, n)) => *n += by,
            None => self.counts.push((code.to_string(), by)),
        }
    }

    pub fn get(&self, code: &str) -> u32 {
        self.counts
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, n)| *n)
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.counts.iter().map(|(c, n)| (c.as_str(), *n))
    }

    pub fn dominant(&self) -> Option<&str> {
        let mut best: Option<(&str, u32)> = None;
        for (code, n) in self.iter() {
            if best.is_none_or(|(_, top)| n > top) {
                best = Some((code, n));
            }
        }
        best.map(|(code, _)| code)
    }
}

impl fmt::Display for PositionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (code, n) in self.iter() {
            if !first {
                f.write_str(";")?;
            }
            first = false;
            write!(f, "{code}:{n}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Place {
    Goalkeeper,
    Defender,
    Midfielder,
    Forward,
    None,
}

impl Place {
    /// Classifies by the last character of the dominant position code.
    pub fn classify(counts: &PositionCounts) -> Self {
        match counts.dominant().and_then(|code| code.chars().last()) {
            None => Place::None,
            Some('K') => Place::Goalkeeper,
            Some('B') => Place::Defender,
            Some('M') => Place::Midfielder,
            Some(_) => Place::Forward,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Place::Goalkeeper => "Goalkeeper",
            Place::Defender => "Defender",
            Place::Midfielder => "Midfielder",
            Place::Forward => "Forward",
            Place::None => "None",
        }
    }
}

impl fmt::Display for Place {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_splits_multi_position_strings() {
        let mut counts = PositionCounts::default();
        counts.record("CM,RB");
        counts.record("CM");
        counts.record(" RB , ");
        assert_eq!(counts.get("CM"), 2);
        assert_eq!(counts.get("RB"), 2);
        assert_eq!(counts.to_string(), "CM:2;RB:2");
    }

    #[test]
    fn midfielder_wins_on_count() {
        let mut counts = PositionCounts::default();
        counts.increment("CM", 3);
        counts.increment("RB", 2);
        assert_eq!(Place::classify(&counts), Place::Midfielder);
    }

    #[test]
    fn ties_go_to_first_seen() {
        let mut counts = PositionCounts::default();
        counts.increment("FW", 2);
        counts.increment("CB", 2);
        assert_eq!(counts.dominant(), Some("FW"));
        assert_eq!(Place::classify(&counts), Place::Forward);
    }

    #[test]
    fn goalkeeper_and_empty() {
        let mut counts = PositionCounts::default();
        assert_eq!(Place::classify(&counts), Place::None);
        counts.record("GK");
        assert_eq!(Place::classify(&counts), Place::Goalkeeper);
        assert_eq!(Place::None.to_string(), "None");
    }
}
