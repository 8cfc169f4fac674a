//! Flattened export record for PDF/image exporters and the public viewer.
//!
//! Consumers never resolve candidate ids themselves: every match carries the
//! entrant's display name, seed and image alongside its tally and geometry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::layout::bracket::{Bounds, BracketLayout, Connector};
use crate::models::tournament::{Entrant, Position, Quadrant, Tournament};

/// Viewport widths the public viewer snaps to.
pub const BREAKPOINTS: [u32; 5] = [320, 768, 1024, 1440, 1920];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedEntrant {
    pub candidate_id: String,
    pub name: String,
    pub seed: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl From<&Entrant> for PublishedEntrant {
    fn from(e: &Entrant) -> Self {
        PublishedEntrant {
            candidate_id: e.candidate_id.clone(),
            name: e.name.clone(),
            seed: e.seed,
            image_url: e.image_url.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedMatch {
    pub id: String,
    pub round: u8,
    pub match_number: u8,
    pub entrant1: Option<PublishedEntrant>,
    pub entrant2: Option<PublishedEntrant>,
    pub votes1: u32,
    pub votes2: u32,
    pub is_left_side: bool,
    pub is_championship: bool,
    pub position: Position,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedCategory {
    pub id: String,
    pub key: String,
    pub name: String,
    pub color: String,
    pub quadrant: Quadrant,
    pub label_x: f32,
    pub label_y: f32,
}

/// Uniform scale applied when the viewport is at least `min_width` wide.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Breakpoint {
    pub min_width: u32,
    pub scale: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishedBracket {
    pub year: i32,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub bounds: Bounds,
    pub categories: Vec<PublishedCategory>,
    pub matches: Vec<PublishedMatch>,
    pub connectors: Vec<Connector>,
    pub breakpoints: Vec<Breakpoint>,
}

/// Flattens a laid-out tournament. `generated_at` is passed in so identical
/// inputs give identical records.
pub fn publish(
    tournament: &Tournament,
    layout: &BracketLayout,
    generated_at: DateTime<Utc>,
) -> PublishedBracket {
    let resolve = |id: &Option<String>| {
        id.as_deref()
            .and_then(|id| tournament.entrant(id))
            .map(PublishedEntrant::from)
    };

    let matches = layout
        .matches
        .iter()
        .map(|m| PublishedMatch {
            id: m.id.clone(),
            round: m.round,
            match_number: m.match_number,
            entrant1: resolve(&m.entrant1),
            entrant2: resolve(&m.entrant2),
            votes1: m.votes1,
            votes2: m.votes2,
            is_left_side: m.is_left_side,
            is_championship: m.is_championship,
            position: m.position,
        })
        .collect();

    let categories = tournament
        .categories
        .iter()
        .map(|c| {
            let label = layout.labels.iter().find(|l| l.category_id == c.id);
            PublishedCategory {
                id: c.id.clone(),
                key: c.key.clone(),
                name: c.name.clone(),
                color: c.color.clone(),
                quadrant: c.quadrant,
                label_x: label.map_or(0.0, |l| l.x),
                label_y: label.map_or(0.0, |l| l.y),
            }
        })
        .collect();

    PublishedBracket {
        year: tournament.year,
        title: tournament.title.clone(),
        generated_at,
        bounds: layout.bounds,
        categories,
        matches,
        connectors: layout.connectors.clone(),
        breakpoints: breakpoint_scales(layout.bounds.width),
    }
}

/// Scale that fits the full canvas width into each breakpoint, never above 1.
/// Rounded to three decimals so the table is stable in JSON.
pub fn breakpoint_scales(canvas_width: f32) -> Vec<Breakpoint> {
    BREAKPOINTS
        .iter()
        .map(|&min_width| {
            let scale = if canvas_width > 0.0 {
                (min_width as f32 / canvas_width).min(1.0)
            } else {
                1.0
            };
            Breakpoint {
                min_width,
                scale: (scale * 1000.0).round() / 1000.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::bracket::{default_layout_config, layout};
    use crate::layout::font_metrics::{AfmMetrics, FontFamily};
    use crate::models::tournament::Category;
    use chrono::TimeZone;

    fn make_tournament() -> Tournament {
        let categories = Quadrant::ALL
            .iter()
            .enumerate()
            .map(|(q, &quadrant)| Category {
                id: quadrant.slug().to_string(),
                key: format!("k{q}"),
                name: format!("Category {q}"),
                color: "#123456".to_string(),
                quadrant,
                entrants: (1..=8)
                    .map(|seed| Entrant {
                        candidate_id: format!("q{q}s{seed}"),
                        name: format!("Saint {q}-{seed}"),
                        seed,
                        image_url: (seed == 1).then(|| format!("/img/q{q}.png")),
                    })
                    .collect(),
            })
            .collect();
        Tournament::assemble(2025, "Published".to_string(), categories)
    }

    fn make_published(t: &Tournament) -> PublishedBracket {
        let config = default_layout_config(FontFamily::Helvetica, 14.0);
        let out = layout(t, &AfmMetrics, &config).unwrap();
        let at = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        publish(t, &out, at)
    }

    #[test]
    fn test_round_one_entrants_resolved() {
        let t = make_tournament();
        let p = make_published(&t);
        let first = p.matches.iter().find(|m| m.id == "r1m1").unwrap();
        let e1 = first.entrant1.as_ref().unwrap();
        assert_eq!(e1.name, "Saint 0-1");
        assert_eq!(e1.seed, 1);
        assert_eq!(e1.image_url.as_deref(), Some("/img/q0.png"));
        assert_eq!(first.entrant2.as_ref().unwrap().seed, 2);
    }

    #[test]
    fn test_unresolved_rounds_stay_empty() {
        let p = make_published(&make_tournament());
        assert_eq!(p.matches.len(), 31);
        assert!(p
            .matches
            .iter()
            .filter(|m| m.round > 1)
            .all(|m| m.entrant1.is_none() && m.entrant2.is_none()));
    }

    #[test]
    fn test_votes_and_positions_carried_through() {
        let mut t = make_tournament();
        t.rounds[0].matches[3].votes1 = 7;
        let p = make_published(&t);
        let m = p.matches.iter().find(|m| m.id == "r1m4").unwrap();
        assert_eq!(m.votes1, 7);
        assert!(m.position.width > 0.0);
    }

    #[test]
    fn test_categories_carry_label_anchor() {
        let p = make_published(&make_tournament());
        assert_eq!(p.categories.len(), 4);
        let right = p.categories.iter().find(|c| c.id == "bottom-right").unwrap();
        assert!(right.label_x > p.bounds.width / 2.0);
        assert!(right.label_y > p.bounds.height / 2.0);
        assert_eq!(p.connectors.len(), 45);
    }

    #[test]
    fn test_breakpoint_scales_cap_at_one() {
        let scales = breakpoint_scales(1600.0);
        let widths: Vec<u32> = scales.iter().map(|b| b.min_width).collect();
        assert_eq!(widths, BREAKPOINTS.to_vec());
        assert_eq!(scales[0].scale, 0.2);
        assert_eq!(scales[1].scale, 0.48);
        assert_eq!(scales[3].scale, 0.9);
        assert_eq!(scales[4].scale, 1.0);
    }

    #[test]
    fn test_publish_is_stable_for_same_timestamp() {
        let t = make_tournament();
        let a = serde_json::to_string(&make_published(&t)).unwrap();
        let b = serde_json::to_string(&make_published(&t)).unwrap();
        assert_eq!(a, b);
        assert!(a.contains("\"generatedAt\":\"2025-03-01T12:00:00Z\""));
    }
}
