use serde::{Deserialize, Serialize};

//
// ─── BADGE ─────────────────────────────────────────────────────────────────────
//

/// A reward granted by the backend when an attempt completes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Badge {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon_url: Option<String>,
}

//
// ─── RESULT ────────────────────────────────────────────────────────────────────
//

/// Where a result came from. Server results always supersede local ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultSource {
    Local,
    Server,
}

/// Outcome of an attempt.
///
/// Reward fields (`xp_earned`, `points_earned`, `new_total_xp`, `badges_earned`)
/// are only meaningful for `ResultSource::Server`.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizResult {
    pub score_points: i32,
    pub correct_count: u32,
    pub wrong_count: u32,
    pub unanswered_count: u32,
    pub percent_correct: f64,
    pub xp_earned: u32,
    pub points_earned: u32,
    pub is_passed: bool,
    pub new_total_xp: Option<u32>,
    pub badges_earned: Vec<Badge>,
    pub source: ResultSource,
}

impl QuizResult {
    #[must_use]
    pub fn total_questions(&self) -> u32 {
        self.correct_count
            .saturating_add(self.wrong_count)
            .saturating_add(self.unanswered_count)
    }

    #[must_use]
    pub fn is_authoritative(&self) -> bool {
        self.source == ResultSource::Server
    }

    /// Prefer `other`, unless only `self` comes from the server.
    #[must_use]
    pub fn reconcile(self, other: QuizResult) -> QuizResult {
        if other.is_authoritative() || !self.is_authoritative() {
            other
        } else {
            self
        }
    }
}
