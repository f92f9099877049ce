use std::collections::VecDeque;
use std::fmt;

pub const FORM_LENGTH: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MatchResult {
    Win,
    Draw,
    Loss,
}

impl MatchResult {
    pub fn from_goals(scored: u32, conceded: u32) -> Self {
        if scored > conceded {
            MatchResult::Win
        } else if scored == conceded {
            MatchResult::Draw
        } else {
            MatchResult::Loss
        }
    }

    pub fn points(self) -> u32 {
        match self {
            MatchResult::Win => 3,
            MatchResult::Draw => 1,
            MatchResult::Loss => 0,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            MatchResult::Win => 'W',
            MatchResult::Draw => 'D',
            MatchResult::Loss => 'L',
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormQueue {
    results: VecDeque<MatchResult>,
}

impl FormQueue {
    pub fn push(&mut self, result: MatchResult) {
        if self.results.len() == FORM_LENGTH {
            self.results.pop_front();
        }
        self.results.push_back(result);
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = MatchResult> + '_ {
        self.results.iter().copied()
    }

    pub fn points(&self) -> u32 {
        self.iter().map(MatchResult::points).sum()
    }
}

impl fmt::Display for FormQueue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for result in self.iter() {
            write!(f, "{}", result.as_char())?;
        }
        Ok(())
    }
}
