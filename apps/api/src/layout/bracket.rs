//! Layout Engine: turns a drafted tournament into pixel geometry.
//!
//! # Placement
//! - Box size is content-driven: the widest entrant name plus padding (capped),
//!   by two measured name rows.
//! - Round 1 splits into two groups of eight. The left group hugs the left
//!   margin, the right group mirrors it against the right margin. Each group
//!   stacks as two four-match category blocks with a wider gap between them.
//! - Rounds 2..=4 are produced per side by merging consecutive pairs: two
//!   horizontal stubs run from the children to a junction, one vertical joins
//!   the children's centers, and the parent sits centered on that span one
//!   connector length past the junction.
//! - The two semifinals feed the championship box at horizontal center. The
//!   left feed is raised and the right feed lowered by the championship
//!   offset so the lines never overlap where they meet.
//!
//! The function is pure: identical tournament, metrics and config give
//! identical output, which export and layout tests rely on.

use serde::{Deserialize, Serialize};

use crate::errors::BracketError;
use crate::invariants::validate_tournament;
use crate::layout::font_metrics::{FontFamily, FontSpec, TextMetrics};
use crate::models::tournament::{Match, Position, Quadrant, Tournament, ROUND_COUNT};

// ────────────────────────────────────────────────────────────────────────────
// Configuration
// ────────────────────────────────────────────────────────────────────────────

/// Geometry constants. All lengths in pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutConfig {
    pub font: FontSpec,
    /// Added to each side of the widest name.
    pub horizontal_padding: f32,
    /// Added above and below each name row.
    pub vertical_padding: f32,
    pub max_box_width: f32,
    pub connector_length: f32,
    pub match_gap: f32,
    /// Extra spacing between the two category blocks on one side.
    pub category_gap: f32,
    pub margin: f32,
    pub championship_offset: f32,
    pub stroke_width: f32,
    /// Distance of category labels from the canvas edge.
    pub label_offset: f32,
}

pub fn default_layout_config(family: FontFamily, size_px: f32) -> LayoutConfig {
    LayoutConfig {
        font: FontSpec { family, size_px },
        horizontal_padding: 10.0,
        vertical_padding: 4.0,
        max_box_width: 220.0,
        connector_length: 20.0,
        match_gap: 16.0,
        category_gap: 40.0,
        margin: 60.0,
        championship_offset: 6.0,
        stroke_width: 2.0,
        label_offset: 24.0,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Output types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connector {
    pub id: String,
    pub orientation: Orientation,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
    pub stroke_width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryLabel {
    pub category_id: String,
    pub text: String,
    pub color: String,
    pub quadrant: Quadrant,
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BracketLayout {
    /// Every match of every round, in round order, with `position` assigned.
    pub matches: Vec<Match>,
    pub connectors: Vec<Connector>,
    pub labels: Vec<CategoryLabel>,
    pub bounds: Bounds,
    pub box_width: f32,
    pub box_height: f32,
}

// ────────────────────────────────────────────────────────────────────────────
// Entry point
// ────────────────────────────────────────────────────────────────────────────

pub fn layout(
    tournament: &Tournament,
    metrics: &dyn TextMetrics,
    config: &LayoutConfig,
) -> Result<BracketLayout, BracketError> {
    validate_tournament(tournament)?;

    let (box_width, box_height) = measure_box(tournament, metrics, config);
    let grid = Grid::new(box_width, box_height, config);

    let mut matches: Vec<Match> = tournament.matches().cloned().collect();
    let mut connectors = Vec::new();

    let mut semifinals = [Position::default(); 2];
    for (side, left) in [true, false].into_iter().enumerate() {
        semifinals[side] = place_side(&mut matches, left, &grid, config, &mut connectors);
    }
    place_championship(&mut matches, semifinals, &grid, config, &mut connectors);

    let labels = place_labels(tournament, &matches, &grid, config);

    Ok(BracketLayout {
        matches,
        connectors,
        labels,
        bounds: Bounds {
            width: grid.width,
            height: grid.height,
        },
        box_width,
        box_height,
    })
}

/// Content-driven match box: widest name + padding (capped), two name rows.
fn measure_box(
    tournament: &Tournament,
    metrics: &dyn TextMetrics,
    config: &LayoutConfig,
) -> (f32, f32) {
    let mut widest = 0.0_f32;
    let mut tallest = 0.0_f32;
    for entrant in tournament.entrants() {
        let size = metrics.measure(&entrant.name, &config.font);
        widest = widest.max(size.width);
        tallest = tallest.max(size.height);
    }

    let width = (widest + 2.0 * config.horizontal_padding).min(config.max_box_width);
    let row_height = tallest + 2.0 * config.vertical_padding;
    (width, 2.0 * row_height)
}

/// Canvas dimensions derived from the box size.
struct Grid {
    box_width: f32,
    box_height: f32,
    width: f32,
    height: f32,
}

impl Grid {
    fn new(box_width: f32, box_height: f32, config: &LayoutConfig) -> Self {
        let cl = config.connector_length;
        // Per side: four round columns with two connector lengths between each.
        let side_span = 4.0 * box_width + 6.0 * cl;
        // The semifinals sit one box width plus two connectors apart.
        let width = 2.0 * (config.margin + side_span) + box_width + 2.0 * cl;
        let height = 2.0 * config.margin
            + 8.0 * box_height
            + 7.0 * config.match_gap
            + config.category_gap;
        Grid {
            box_width,
            box_height,
            width,
            height,
        }
    }

    fn center_x(&self) -> f32 {
        self.width / 2.0
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Side placement and pairwise merge
// ────────────────────────────────────────────────────────────────────────────

/// Indices into `matches` for one side of one round, in match order.
fn side_indices(matches: &[Match], round: u8, left: bool) -> Vec<usize> {
    matches
        .iter()
        .enumerate()
        .filter(|(_, m)| m.round == round && m.is_left_side == left && !m.is_championship)
        .map(|(i, _)| i)
        .collect()
}

/// Places one half's rounds 1..=4 and returns the semifinal box.
fn place_side(
    matches: &mut [Match],
    left: bool,
    grid: &Grid,
    config: &LayoutConfig,
    connectors: &mut Vec<Connector>,
) -> Position {
    let cl = config.connector_length;
    let x = if left {
        config.margin
    } else {
        grid.width - config.margin - grid.box_width
    };

    let mut current = side_indices(matches, 1, left);
    for (i, &idx) in current.iter().enumerate() {
        let block_gap = if i >= 4 { config.category_gap } else { 0.0 };
        matches[idx].position = Position {
            x,
            y: config.margin + i as f32 * (grid.box_height + config.match_gap) + block_gap,
            width: grid.box_width,
            height: grid.box_height,
        };
    }

    for round in 2..ROUND_COUNT {
        let parents = side_indices(matches, round, left);
        for (pair, &parent_idx) in current.chunks(2).zip(parents.iter()) {
            let [top_idx, bottom_idx] = [pair[0], pair[1]];
            let top = matches[top_idx].position;
            let bottom = matches[bottom_idx].position;

            // Shared edge faces the center of the canvas.
            let edge = if left { top.right() } else { top.x };
            let junction = if left { edge + cl } else { edge - cl };
            let parent_id = matches[parent_idx].id.clone();

            for child_idx in [top_idx, bottom_idx] {
                let child = &matches[child_idx];
                let cy = child.position.center_y();
                connectors.push(Connector {
                    id: format!("{parent_id}-{}-h", child.id),
                    orientation: Orientation::Horizontal,
                    x1: edge,
                    y1: cy,
                    x2: junction,
                    y2: cy,
                    stroke_width: config.stroke_width,
                });
            }
            connectors.push(Connector {
                id: format!("{parent_id}-v"),
                orientation: Orientation::Vertical,
                x1: junction,
                y1: top.center_y(),
                x2: junction,
                y2: bottom.center_y(),
                stroke_width: config.stroke_width,
            });

            let mid = (top.center_y() + bottom.center_y()) / 2.0;
            let parent_x = if left {
                junction + cl
            } else {
                junction - cl - grid.box_width
            };
            matches[parent_idx].position = Position {
                x: parent_x,
                y: mid - grid.box_height / 2.0,
                width: grid.box_width,
                height: grid.box_height,
            };
        }
        current = parents;
    }

    current
        .first()
        .map(|&idx| matches[idx].position)
        .unwrap_or_default()
}

/// Centers the final above the semifinal line and routes both feeds into it.
///
/// The left feed runs at `mid - offset`, the right feed at `mid + offset`,
/// where `mid` is halfway between the semifinal centers. Both meet the
/// vertical drop at horizontal center, which rises to the final's bottom edge.
fn place_championship(
    matches: &mut [Match],
    semifinals: [Position; 2],
    grid: &Grid,
    config: &LayoutConfig,
    connectors: &mut Vec<Connector>,
) {
    let Some(final_idx) = matches.iter().position(|m| m.is_championship) else {
        return;
    };
    let [left, right] = semifinals;
    let center_x = grid.center_x();
    let mid = (left.center_y() + right.center_y()) / 2.0;
    let raised = mid - config.championship_offset;
    let lowered = mid + config.championship_offset;

    let position = Position {
        x: center_x - grid.box_width / 2.0,
        y: raised - config.connector_length - grid.box_height,
        width: grid.box_width,
        height: grid.box_height,
    };
    let final_id = matches[final_idx].id.clone();
    matches[final_idx].position = position;

    connectors.push(Connector {
        id: format!("{final_id}-left-h"),
        orientation: Orientation::Horizontal,
        x1: left.right(),
        y1: raised,
        x2: center_x,
        y2: raised,
        stroke_width: config.stroke_width,
    });
    connectors.push(Connector {
        id: format!("{final_id}-right-h"),
        orientation: Orientation::Horizontal,
        x1: right.x,
        y1: lowered,
        x2: center_x,
        y2: lowered,
        stroke_width: config.stroke_width,
    });
    connectors.push(Connector {
        id: format!("{final_id}-v"),
        orientation: Orientation::Vertical,
        x1: center_x,
        y1: position.bottom(),
        x2: center_x,
        y2: lowered,
        stroke_width: config.stroke_width,
    });
}

/// Labels sit at a fixed distance from their side's canvas edge, centered on
/// the span from the category's first round-1 box to its last.
fn place_labels(
    tournament: &Tournament,
    matches: &[Match],
    grid: &Grid,
    config: &LayoutConfig,
) -> Vec<CategoryLabel> {
    tournament
        .categories
        .iter()
        .map(|c| {
            let boxes: Vec<Position> = matches
                .iter()
                .filter(|m| m.round == 1 && m.category_id.as_deref() == Some(c.id.as_str()))
                .map(|m| m.position)
                .collect();
            let top = boxes.iter().map(|p| p.y).fold(f32::INFINITY, f32::min);
            let bottom = boxes.iter().map(|p| p.bottom()).fold(f32::NEG_INFINITY, f32::max);
            let x = if c.quadrant.is_left() {
                config.label_offset
            } else {
                grid.width - config.label_offset
            };
            CategoryLabel {
                category_id: c.id.clone(),
                text: c.name.clone(),
                color: c.color.clone(),
                quadrant: c.quadrant,
                x,
                y: (top + bottom) / 2.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::font_metrics::{AfmMetrics, TextSize};
    use crate::models::tournament::{Category, Entrant};

    /// Fixed-advance metrics: 8px per character, 16px rows.
    struct MonoMetrics;

    impl TextMetrics for MonoMetrics {
        fn measure(&self, text: &str, _font: &FontSpec) -> TextSize {
            TextSize {
                width: text.chars().count() as f32 * 8.0,
                height: 16.0,
            }
        }
    }

    fn make_tournament(name_of: impl Fn(usize, u8) -> String) -> Tournament {
        let categories = Quadrant::ALL
            .iter()
            .enumerate()
            .map(|(q, &quadrant)| Category {
                id: quadrant.slug().to_string(),
                key: format!("k{q}"),
                name: format!("Category {q}"),
                color: "#000".to_string(),
                quadrant,
                entrants: (1..=8)
                    .map(|seed| Entrant {
                        candidate_id: format!("q{q}s{seed}"),
                        name: name_of(q, seed),
                        seed,
                        image_url: None,
                    })
                    .collect(),
            })
            .collect();
        Tournament::assemble(2025, "Layout".to_string(), categories)
    }

    fn uniform_tournament() -> Tournament {
        make_tournament(|q, seed| format!("Saint {q}{seed}"))
    }

    fn make_config() -> LayoutConfig {
        default_layout_config(FontFamily::Helvetica, 14.0)
    }

    fn find<'a>(layout: &'a BracketLayout, id: &str) -> &'a Match {
        layout.matches.iter().find(|m| m.id == id).unwrap()
    }

    fn connector<'a>(layout: &'a BracketLayout, id: &str) -> &'a Connector {
        layout.connectors.iter().find(|c| c.id == id).unwrap()
    }

    // ── sizing ──────────────────────────────────────────────────────────────

    #[test]
    fn test_uniform_names_share_box_size() {
        let out = layout(&uniform_tournament(), &MonoMetrics, &make_config()).unwrap();
        // "Saint 01" = 8 chars * 8px + 2 * 10px padding; rows 16 + 2 * 4.
        assert_eq!(out.box_width, 84.0);
        assert_eq!(out.box_height, 48.0);
        for m in out.matches.iter().filter(|m| m.round == 1) {
            assert_eq!(m.position.width, 84.0);
            assert_eq!(m.position.height, 48.0);
        }
    }

    #[test]
    fn test_box_width_follows_longest_name_and_clamps() {
        let t = make_tournament(|q, seed| {
            if q == 2 && seed == 5 {
                "Teresa Benedicta".to_string()
            } else {
                "Ann".to_string()
            }
        });
        let out = layout(&t, &MonoMetrics, &make_config()).unwrap();
        assert_eq!(out.box_width, 16.0 * 8.0 + 20.0);

        let long = make_tournament(|_, _| "x".repeat(60));
        let out = layout(&long, &MonoMetrics, &make_config()).unwrap();
        assert_eq!(out.box_width, make_config().max_box_width);
    }

    // ── structure ───────────────────────────────────────────────────────────

    #[test]
    fn test_round_counts_and_connector_total() {
        let out = layout(&uniform_tournament(), &MonoMetrics, &make_config()).unwrap();
        let per_round: Vec<usize> = (1..=5)
            .map(|r| out.matches.iter().filter(|m| m.round == r).count())
            .collect();
        assert_eq!(per_round, vec![16, 8, 4, 2, 1]);
        // 15 merges, each two horizontal feeds and one vertical.
        assert_eq!(out.connectors.len(), 45);
        let vertical = out
            .connectors
            .iter()
            .filter(|c| c.orientation == Orientation::Vertical)
            .count();
        assert_eq!(vertical, 15);
    }

    #[test]
    fn test_left_group_flush_left_right_group_mirrored() {
        let config = make_config();
        let out = layout(&uniform_tournament(), &MonoMetrics, &config).unwrap();
        for m in out.matches.iter().filter(|m| m.round == 1) {
            if m.is_left_side {
                assert_eq!(m.position.x, config.margin);
            } else {
                assert_eq!(m.position.right(), out.bounds.width - config.margin);
            }
        }
        // Mirror symmetry for every non-final round.
        for round in 1..=4u8 {
            let left: Vec<&Match> = out
                .matches
                .iter()
                .filter(|m| m.round == round && m.is_left_side)
                .collect();
            let right: Vec<&Match> = out
                .matches
                .iter()
                .filter(|m| m.round == round && !m.is_left_side && !m.is_championship)
                .collect();
            for (l, r) in left.iter().zip(right.iter()) {
                assert!((l.position.x - (out.bounds.width - r.position.right())).abs() < 1e-3);
                assert!((l.position.y - r.position.y).abs() < 1e-3);
            }
        }
    }

    #[test]
    fn test_category_blocks_have_extra_gap() {
        let config = make_config();
        let out = layout(&uniform_tournament(), &MonoMetrics, &config).unwrap();
        let step = |a: &str, b: &str| find(&out, b).position.y - find(&out, a).position.y;
        let normal = out.box_height + config.match_gap;
        assert_eq!(step("r1m1", "r1m2"), normal);
        assert_eq!(step("r1m4", "r1m5"), normal + config.category_gap);
        assert_eq!(step("r1m12", "r1m13"), normal + config.category_gap);
    }

    #[test]
    fn test_parent_centered_between_children() {
        let config = make_config();
        let out = layout(&uniform_tournament(), &MonoMetrics, &config).unwrap();
        let a = find(&out, "r1m1").position;
        let b = find(&out, "r1m2").position;
        let parent = find(&out, "r2m1").position;
        assert_eq!(parent.center_y(), (a.center_y() + b.center_y()) / 2.0);
        assert_eq!(parent.x, a.right() + 2.0 * config.connector_length);

        let v = connector(&out, "r2m1-v");
        assert_eq!(v.x1, a.right() + config.connector_length);
        assert_eq!((v.y1, v.y2), (a.center_y(), b.center_y()));

        let h = connector(&out, "r2m1-r1m2-h");
        assert_eq!((h.x1, h.x2), (b.right(), v.x1));
        assert_eq!(h.y1, b.center_y());
    }

    #[test]
    fn test_right_side_merges_toward_center() {
        let config = make_config();
        let out = layout(&uniform_tournament(), &MonoMetrics, &config).unwrap();
        let child = find(&out, "r1m9").position;
        let parent = find(&out, "r2m5").position;
        assert_eq!(parent.right(), child.x - 2.0 * config.connector_length);
        let v = connector(&out, "r2m5-v");
        assert_eq!(v.x1, child.x - config.connector_length);
    }

    // ── championship ────────────────────────────────────────────────────────

    #[test]
    fn test_championship_offsets_equal_and_opposite() {
        let config = make_config();
        let out = layout(&uniform_tournament(), &MonoMetrics, &config).unwrap();
        let left_semi = find(&out, "r4m1").position;
        let right_semi = find(&out, "r4m2").position;
        let mid = (left_semi.center_y() + right_semi.center_y()) / 2.0;

        let left = connector(&out, "r5m1-left-h");
        let right = connector(&out, "r5m1-right-h");
        let left_delta = left.y1 - mid;
        let right_delta = right.y1 - mid;
        assert_eq!(left_delta, -config.championship_offset);
        assert_eq!(right_delta, config.championship_offset);
        assert_eq!(left_delta, -right_delta);
        assert_ne!(left.y1, right.y1, "feeds must not overlap");
    }

    #[test]
    fn test_championship_centered_and_fed() {
        let out = layout(&uniform_tournament(), &MonoMetrics, &make_config()).unwrap();
        let fin = find(&out, "r5m1");
        assert!(fin.is_championship);
        let center = fin.position.x + fin.position.width / 2.0;
        assert!((center - out.bounds.width / 2.0).abs() < 1e-3);

        let left = connector(&out, "r5m1-left-h");
        let right = connector(&out, "r5m1-right-h");
        let drop = connector(&out, "r5m1-v");
        assert_eq!(left.x1, find(&out, "r4m1").position.right());
        assert_eq!(right.x1, find(&out, "r4m2").position.x);
        assert_eq!((left.x2, right.x2), (drop.x1, drop.x1));
        assert_eq!(drop.y1, fin.position.bottom());
        assert_eq!(drop.y2, right.y1);
    }

    #[test]
    fn test_nothing_leaves_the_canvas() {
        let out = layout(&uniform_tournament(), &AfmMetrics, &make_config()).unwrap();
        for m in &out.matches {
            assert!(m.position.x >= 0.0 && m.position.right() <= out.bounds.width, "{}", m.id);
            assert!(m.position.y >= 0.0 && m.position.bottom() <= out.bounds.height, "{}", m.id);
        }
    }

    // ── labels ──────────────────────────────────────────────────────────────

    #[test]
    fn test_labels_centered_on_category_span() {
        let config = make_config();
        let out = layout(&uniform_tournament(), &MonoMetrics, &config).unwrap();
        let top_right = out.labels.iter().find(|l| l.category_id == "top-right").unwrap();
        let first = find(&out, "r1m9").position;
        let last = find(&out, "r1m12").position;
        assert_eq!(top_right.y, (first.y + last.bottom()) / 2.0);
        assert_eq!(top_right.x, out.bounds.width - config.label_offset);

        let bottom_left = out.labels.iter().find(|l| l.category_id == "bottom-left").unwrap();
        assert_eq!(bottom_left.x, config.label_offset);
    }

    // ── determinism / validation ────────────────────────────────────────────

    #[test]
    fn test_layout_is_deterministic() {
        let t = uniform_tournament();
        let a = layout(&t, &AfmMetrics, &make_config()).unwrap();
        let b = layout(&t, &AfmMetrics, &make_config()).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            serde_json::to_string(&a).unwrap(),
            serde_json::to_string(&b).unwrap()
        );
    }

    #[test]
    fn test_layout_rejects_malformed_bracket() {
        let mut t = uniform_tournament();
        t.rounds.pop();
        assert!(matches!(
            layout(&t, &MonoMetrics, &make_config()),
            Err(BracketError::InvariantViolation(_))
        ));
    }

    #[test]
    fn test_layout_leaves_tournament_positions_alone() {
        let t = uniform_tournament();
        let _ = layout(&t, &MonoMetrics, &make_config()).unwrap();
        assert!(t.matches().all(|m| m.position == Position::default()));
    }
}
