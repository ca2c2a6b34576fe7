/// Per-team bookkeeping mirrored from the standard SSL referee message.
#[derive(Debug, Clone, PartialEq)]
pub struct TeamInfo {
    pub name: String,
    pub score: u32,
    pub red_cards: u32,
    pub yellow_cards: u32,
    /// Remaining time on each active yellow card, oldest first (seconds).
    pub yellow_card_times: Vec<f64>,
    pub timeouts: u32,
    pub timeout_time: i64,
    pub goalkeeper: u8,
    pub foul_counter: u32,
    pub ball_placement_failures: u32,
    pub can_place_ball: bool,
    pub max_allowed_bots: u8,
    pub bot_substitution_intent: bool,
    pub bot_substitution_allowed: bool,
    pub bot_substitutions_left: u8,
}

impl TeamInfo {
    pub fn new(name: &str, max_allowed_bots: u8) -> Self {
        TeamInfo {
            name: name.to_string(),
            score: 0,
            red_cards: 0,
            yellow_cards: 0,
            yellow_card_times: Vec::new(),
            timeouts: 4,
            timeout_time: 300,
            goalkeeper: 0,
            foul_counter: 0,
            ball_placement_failures: 0,
            can_place_ball: true,
            max_allowed_bots,
            bot_substitution_intent: false,
            bot_substitution_allowed: true,
            bot_substitutions_left: 5,
        }
    }

    pub fn increment_score(&mut self) {
        self.score += 1;
    }

    pub fn add_foul(&mut self) {
        self.foul_counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_team_starts_clean() {
        let team = TeamInfo::new("Yellow", 6);
        assert_eq!(team.score, 0);
        assert_eq!(team.max_allowed_bots, 6);
        assert!(team.can_place_ball);
    }

    #[test]
    fn test_increment_score() {
        let mut team = TeamInfo::new("Blue", 6);
        team.increment_score();
        team.increment_score();
        assert_eq!(team.score, 2);
    }
}
