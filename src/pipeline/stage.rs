use std::fmt;

/// One step of the outreach sequence. Order of the variants is the order
/// contacts move through; `BreakupEmail` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Stage {
    #[default]
    FirstEmail,
    SecondEmail,
    PhoneOrSocialConnect,
    BreakupEmail,
}

impl Stage {
    pub const ALL: [Stage; 4] = [
        Stage::FirstEmail,
        Stage::SecondEmail,
        Stage::PhoneOrSocialConnect,
        Stage::BreakupEmail,
    ];

    /// The stage after this one, or `None` at the end of the sequence.
    pub fn successor(self) -> Option<Stage> {
        match self {
            Stage::FirstEmail => Some(Stage::SecondEmail),
            Stage::SecondEmail => Some(Stage::PhoneOrSocialConnect),
            Stage::PhoneOrSocialConnect => Some(Stage::BreakupEmail),
            Stage::BreakupEmail => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self.successor().is_none()
    }

    /// Zero-based position in the sequence.
    pub fn index(self) -> usize {
        match self {
            Stage::FirstEmail => 0,
            Stage::SecondEmail => 1,
            Stage::PhoneOrSocialConnect => 2,
            Stage::BreakupEmail => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Stage::FirstEmail => "First Email",
            Stage::SecondEmail => "Second Email",
            Stage::PhoneOrSocialConnect => "Phone/LinkedIn Connect",
            Stage::BreakupEmail => "Breakup Email",
        }
    }

    /// Parse a display label (case-insensitive) or a 1-based position.
    pub fn parse(input: &str) -> Option<Stage> {
        let input = input.trim();
        if let Ok(n) = input.parse::<usize>() {
            return n.checked_sub(1).and_then(|i| Stage::ALL.get(i).copied());
        }
        Stage::ALL
            .iter()
            .copied()
            .find(|s| s.label().eq_ignore_ascii_case(input))
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_successor_walks_forward_and_stops() {
        assert_eq!(Stage::FirstEmail.successor(), Some(Stage::SecondEmail));
        assert_eq!(Stage::SecondEmail.successor(), Some(Stage::PhoneOrSocialConnect));
        assert_eq!(Stage::PhoneOrSocialConnect.successor(), Some(Stage::BreakupEmail));
        assert_eq!(Stage::BreakupEmail.successor(), None);
    }

    #[test]
    fn test_successor_index_is_strictly_increasing() {
        for stage in Stage::ALL {
            if let Some(next) = stage.successor() {
                assert_eq!(next.index(), stage.index() + 1);
            }
        }
    }

    #[test]
    fn test_only_breakup_is_terminal() {
        let terminal: Vec<_> = Stage::ALL.iter().filter(|s| s.is_terminal()).collect();
        assert_eq!(terminal, vec![&Stage::BreakupEmail]);
    }

    #[test]
    fn test_parse_label_and_position() {
        assert_eq!(Stage::parse("phone/linkedin connect"), Some(Stage::PhoneOrSocialConnect));
        assert_eq!(Stage::parse(" Second Email "), Some(Stage::SecondEmail));
        assert_eq!(Stage::parse("4"), Some(Stage::BreakupEmail));
        assert_eq!(Stage::parse("0"), None);
        assert_eq!(Stage::parse("5"), None);
        assert_eq!(Stage::parse("third email"), None);
    }
}
