//! Known bracket categories.
//!
//! Pool records flag membership by these keys. The random category draw picks
//! from this list, and forced categories must name entries in it.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CategoryDef {
    pub key: &'static str,
    pub name: &'static str,
    pub color: &'static str,
}

#[rustfmt::skip]
pub static CATALOG: &[CategoryDef] = &[
    CategoryDef { key: "apostles", name: "Apostles & Evangelists", color: "#B22234" },
    CategoryDef { key: "martyrs", name: "Martyrs", color: "#8B0000" },
    CategoryDef { key: "popes", name: "Popes", color: "#C9A227" },
    CategoryDef { key: "mystics", name: "Mystics", color: "#5B3A8C" },
    CategoryDef { key: "doctors", name: "Doctors of the Church", color: "#1F4E79" },
    CategoryDef { key: "virgins", name: "Virgins", color: "#4F86C6" },
    CategoryDef { key: "founders", name: "Founders", color: "#2E7D32" },
    CategoryDef { key: "missionaries", name: "Missionaries", color: "#D2691E" },
    CategoryDef { key: "royals", name: "Kings & Queens", color: "#6A1B9A" },
    CategoryDef { key: "hermits", name: "Hermits & Desert Fathers", color: "#795548" },
    CategoryDef { key: "modern", name: "Modern Saints", color: "#00838F" },
    CategoryDef { key: "patrons", name: "Patron Saints", color: "#AD1457" },
];

pub fn lookup(key: &str) -> Option<&'static CategoryDef> {
    CATALOG.iter().find(|c| c.key == key)
}
