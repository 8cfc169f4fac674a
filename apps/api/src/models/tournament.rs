use serde::{Deserialize, Serialize};

/// Bracket shape for a 32-entrant tournament.
pub const CATEGORY_COUNT: usize = 4;
pub const ENTRANTS_PER_CATEGORY: usize = 8;
pub const ROUND_COUNT: u8 = 5;

// ────────────────────────────────────────────────────────────────────────────
// Selection configuration
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SelectionWeighting {
    #[default]
    Balanced,
    Popularity,
    Random,
}

/// Rules for drafting one year's bracket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TournamentConfig {
    pub year: i32,
    #[serde(default)]
    pub selection_weighting: SelectionWeighting,
    #[serde(default)]
    pub exclude_recently_used: bool,
    #[serde(default)]
    pub years_to_exclude: u32,
    /// Exactly four catalog keys; skips the random category draw when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub forced_categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl TournamentConfig {
    pub fn for_year(year: i32) -> Self {
        Self {
            year,
            selection_weighting: SelectionWeighting::default(),
            exclude_recently_used: false,
            years_to_exclude: 0,
            forced_categories: None,
            title: None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Bracket structure
// ────────────────────────────────────────────────────────────────────────────

/// One of the four bracket regions. Top-left and bottom-left form the left half.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quadrant {
    TopLeft,
    BottomLeft,
    TopRight,
    BottomRight,
}

impl Quadrant {
    /// Assignment order for resolved categories; also the round-1 match order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::TopLeft,
        Quadrant::BottomLeft,
        Quadrant::TopRight,
        Quadrant::BottomRight,
    ];

    pub fn is_left(self) -> bool {
        matches!(self, Quadrant::TopLeft | Quadrant::BottomLeft)
    }

    /// Stable slug, also used as the category id.
    pub fn slug(self) -> &'static str {
        match self {
            Quadrant::TopLeft => "top-left",
            Quadrant::BottomLeft => "bottom-left",
            Quadrant::TopRight => "top-right",
            Quadrant::BottomRight => "bottom-right",
        }
    }

    /// Index of this quadrant's first round-1 match.
    pub fn first_match_index(self) -> usize {
        match self {
            Quadrant::TopLeft => 0,
            Quadrant::BottomLeft => 4,
            Quadrant::TopRight => 8,
            Quadrant::BottomRight => 12,
        }
    }
}

/// A seeded candidate occupying one of a category's eight slots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Entrant {
    pub candidate_id: String,
    pub name: String,
    /// Display rank 1..=8. Round-1 pairings stay positional regardless.
    pub seed: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub key: String,
    pub name: String,
    pub color: String,
    pub quadrant: Quadrant,
    pub entrants: Vec<Entrant>,
}

impl Category {
    /// Candidate id pairs for this category's four round-1 matches (slot 1v2, 3v4, ...).
    pub fn pairings(&self) -> Vec<(String, String)> {
        self.entrants
            .chunks(2)
            .filter(|pair| pair.len() == 2)
            .map(|pair| (pair[0].candidate_id.clone(), pair[1].candidate_id.clone()))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Position {
    pub fn center_y(&self) -> f32 {
        self.y + self.height / 2.0
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub id: String,
    pub round: u8,
    pub match_number: u8,
    /// Candidate ids. Round 1 is always populated; later rounds fill as winners resolve.
    pub entrant1: Option<String>,
    pub entrant2: Option<String>,
    pub votes1: u32,
    pub votes2: u32,
    pub is_left_side: bool,
    pub is_championship: bool,
    /// Owning category for round-1 matches.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default)]
    pub position: Position,
}

impl Match {
    pub fn new(round: u8, match_number: u8, is_left_side: bool) -> Self {
        Self {
            id: match_id(round, match_number),
            round,
            match_number,
            entrant1: None,
            entrant2: None,
            votes1: 0,
            votes2: 0,
            is_left_side,
            is_championship: round == ROUND_COUNT,
            category_id: None,
            position: Position::default(),
        }
    }

    pub fn references(&self, candidate_id: &str) -> bool {
        self.entrant1.as_deref() == Some(candidate_id)
            || self.entrant2.as_deref() == Some(candidate_id)
    }

    /// Sets both entrants, zeroing the tally when either side actually changes.
    pub fn set_entrants(&mut self, entrant1: Option<String>, entrant2: Option<String>) {
        if self.entrant1 != entrant1 || self.entrant2 != entrant2 {
            self.entrant1 = entrant1;
            self.entrant2 = entrant2;
            self.reset_votes();
        }
    }

    pub fn reset_votes(&mut self) {
        self.votes1 = 0;
        self.votes2 = 0;
    }
}

pub fn match_id(round: u8, match_number: u8) -> String {
    format!("r{round}m{match_number}")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Round {
    pub number: u8,
    pub matches: Vec<Match>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub year: i32,
    pub title: String,
    pub categories: Vec<Category>,
    pub rounds: Vec<Round>,
}

impl Tournament {
    /// Builds the five-round skeleton from four quadrant-ordered categories.
    ///
    /// Round 1 pairs each category's slots positionally; later rounds start empty.
    /// Within every round the left half's matches come first.
    pub fn assemble(year: i32, title: String, categories: Vec<Category>) -> Self {
        let mut round_one = Vec::with_capacity(16);
        let mut ordered: Vec<&Category> = categories.iter().collect();
        ordered.sort_by_key(|c| c.quadrant);

        for category in ordered {
            for (a, b) in category.pairings() {
                let number = round_one.len() as u8 + 1;
                let mut m = Match::new(1, number, category.quadrant.is_left());
                m.entrant1 = Some(a);
                m.entrant2 = Some(b);
                m.category_id = Some(category.id.clone());
                round_one.push(m);
            }
        }

        let mut rounds = vec![Round {
            number: 1,
            matches: round_one,
        }];
        for number in 2..=ROUND_COUNT {
            let size = 1usize << (ROUND_COUNT - number);
            let matches = (0..size)
                .map(|i| {
                    let is_left = number < ROUND_COUNT && i < size / 2;
                    Match::new(number, i as u8 + 1, is_left)
                })
                .collect();
            rounds.push(Round { number, matches });
        }

        Tournament {
            year,
            title,
            categories,
            rounds,
        }
    }

    /// Resolves a category by its stable id (quadrant slug) or its current key.
    pub fn find_category(&self, reference: &str) -> Option<usize> {
        self.categories
            .iter()
            .position(|c| c.id == reference)
            .or_else(|| self.categories.iter().position(|c| c.key == reference))
    }

    pub fn matches(&self) -> impl Iterator<Item = &Match> {
        self.rounds.iter().flat_map(|r| r.matches.iter())
    }

    pub fn entrants(&self) -> impl Iterator<Item = &Entrant> {
        self.categories.iter().flat_map(|c| c.entrants.iter())
    }

    pub fn entrant(&self, candidate_id: &str) -> Option<&Entrant> {
        self.entrants().find(|e| e.candidate_id == candidate_id)
    }
}
