//! Built-in seed names, imported once on first run.
//!
//! Seed names come as generational lists per gender, the way the game
//! ships them. Each generation list is imported in order, male lists first.

use serde::{Deserialize, Serialize};

use super::entry::Gender;

const MALE_GENERATIONS: &[&[&str]] = &[
    &[
        "Abel", "Bram", "Caspar", "Dorian", "Elric", "Fennick", "Garrow", "Hollis", "Ivo",
        "Jory", "Kestrel", "Lorcan", "Marek", "Nils", "Oswin", "Pell", "Quill", "Roderick",
        "Silas", "Tobin", "Ulric", "Varro", "Wystan", "Xan", "Yorick", "Zeb",
    ],
    &[
        "Alder", "Basil", "Corin", "Dunstan", "Ewan", "Florian", "Gideon", "Hamish", "Idris",
        "Jasper", "Kit", "Leander", "Merrick", "Nestor", "Orrin", "Piers", "Quentin", "Rufus",
        "Soren", "Tarquin", "Uriel", "Vaughn", "Wilder", "Xavi", "Yann", "Zoltan",
    ],
];

const FEMALE_GENERATIONS: &[&[&str]] = &[
    &[
        "Anna", "Bryony", "Calla", "Delphine", "Elowen", "Fern", "Greta", "Hazel", "Isla",
        "Juniper", "Kyra", "Linnea", "Maren", "Nell", "Odette", "Primrose", "Quinby", "Rosalind",
        "Saffi", "Tamsin", "Una", "Verity", "Wren", "Xanthe", "Yarrow", "Zinnia",
    ],
    &[
        "Amaryllis", "Blythe", "Cordelia", "Dulcie", "Esme", "Freya", "Ginevra", "Honor",
        "Imogen", "Jessamy", "Kerensa", "Lark", "Morwenna", "Nerys", "Ottilie", "Posy",
        "Quenby", "Rhiannon", "Seren", "Thea", "Ursa", "Violet", "Willa", "Xenia", "Ysolde",
        "Zelda",
    ],
];

/// Generational name lists for each gender
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedNames {
    #[serde(default)]
    pub male: Vec<Vec<String>>,
    #[serde(default)]
    pub female: Vec<Vec<String>>,
}

impl SeedNames {
    /// The lists shipped with the crate
    pub fn builtin() -> Self {
        Self {
            male: to_owned_lists(MALE_GENERATIONS),
            female: to_owned_lists(FEMALE_GENERATIONS),
        }
    }

    /// Every (gender, name) pair in import order
    pub fn iter(&self) -> impl Iterator<Item = (Gender, &str)> + '_ {
        let male = self
            .male
            .iter()
            .flatten()
            .map(|name| (Gender::Male, name.as_str()));
        let female = self
            .female
            .iter()
            .flatten()
            .map(|name| (Gender::Female, name.as_str()));
        male.chain(female)
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn to_owned_lists(lists: &[&[&str]]) -> Vec<Vec<String>> {
    lists
        .iter()
        .map(|generation| generation.iter().map(|name| name.to_string()).collect())
        .collect()
}
