//! Bird fixtures shared by unit and integration tests.

use crate::models::{BirdRef, CompetitionResult, Gender};

/// Straight paternal line `{prefix}0 <- {prefix}1 <- ... <- {prefix}{len-1}`.
///
/// Element 0 is the subject. Each bird names its father by bare identifier.
pub fn paternal_line(prefix: &str, len: usize) -> Vec<BirdRef> {
    (0..len)
        .map(|i| {
            let bird = BirdRef::new(format!("{prefix}{i}")).with_gender(Gender::Male);
            if i + 1 < len {
                bird.with_father(format!("{prefix}{}", i + 1).as_str())
            } else {
                bird
            }
        })
        .collect()
}

/// Subject `S` whose father `F` and mother `M` share the sire `G`.
///
/// Returns the subject and the records the lookup should hold.
pub fn diamond() -> (BirdRef, Vec<BirdRef>) {
    let subject = BirdRef::new("S").with_father("F").with_mother("M");
    let records = vec![
        BirdRef::new("F").with_gender(Gender::Male).with_father("G"),
        BirdRef::new("M").with_gender(Gender::Female).with_father("G"),
        BirdRef::new("G").with_gender(Gender::Male),
    ];
    (subject, records)
}

/// `A` and `B` naming each other as father.
pub fn cyclic_pair() -> (BirdRef, Vec<BirdRef>) {
    let subject = BirdRef::new("A").with_father("B");
    let records = vec![BirdRef::new("A").with_father("B"), BirdRef::new("B").with_father("A")];
    (subject, records)
}

/// A small loft registry in the JSON export format, with one competition history.
pub fn registry_json() -> String {
    serde_json::json!({
        "birds": [
            {
                "identifier": "NL-2021-1001",
                "name": "Blue Lightning",
                "gender": "male",
                "father": "NL-2018-2001",
                "mother": {
                    "identifier": "NL-2019-3001",
                    "name": "Silver Queen",
                    "gender": "hen",
                    "father": "NL-2015-4001"
                }
            },
            { "identifier": "NL-2018-2001", "name": "Old Warrior", "gender": "cock", "father": "NL-2018-2001" },
            { "identifier": "NL-2015-4001", "gender": "male", "mother": "BE-2010-9999" },
            { "identifier": "NL-2018-20010", "name": "Decoy" }
        ],
        "competitions": {
            "NL-2021-1001": [
                { "name": "Barcelona", "date": "2024-07-05", "distance_km": 1092.5, "placement": 14 }
            ]
        }
    })
    .to_string()
}

/// Competition result with a name and placement.
pub fn result(name: &str, placement: u32) -> CompetitionResult {
    CompetitionResult::new(name).with_placement(placement)
}
