//! HUD and overlay text

use crate::sim::ScoreState;

/// Score line shown in the corner every frame
pub fn hud_text(score: &ScoreState) -> String {
    format!("Score: {} | High Score: {}", score.current, score.best)
}

/// Final numbers shown on the game-over overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameOverSummary {
    pub score: u64,
    pub best: u64,
    pub new_best: bool,
}

impl GameOverSummary {
    pub fn score_line(&self) -> String {
        format!("Your Score: {}", self.score)
    }

    pub fn best_line(&self) -> String {
        if self.new_best {
            format!("High Score: {} (new!)", self.best)
        } else {
            format!("High Score: {}", self.best)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hud_text() {
        let score = ScoreState {
            current: 17,
            best: 250,
        };
        assert_eq!(hud_text(&score), "Score: 17 | High Score: 250");
    }

    #[test]
    fn test_summary_lines() {
        let summary = GameOverSummary {
            score: 300,
            best: 300,
            new_best: true,
        };
        assert_eq!(summary.score_line(), "Your Score: 300");
        assert_eq!(summary.best_line(), "High Score: 300 (new!)");

        let summary = GameOverSummary {
            score: 12,
            best: 300,
            new_best: false,
        };
        assert_eq!(summary.best_line(), "High Score: 300");
    }
}
