//! Shared record fixtures for tests. Compiled only with the `test-utils`
//! feature (or under `cfg(test)`), never in production builds.

use crate::codec::{Record, Schema};
use crate::field::{
    ChildCompoundField, ColumnField, ColumnListField, CompoundField, CompoundListField, FieldCodec,
    Row,
};
use serde_json::json;

crate::wire_enum! {
    pub enum Grade: u8 {
        Common = 0,
        Rare = 1,
        Epic = 2,
    }
}

/// Inline price group; cells come from `PriceBase` / `PriceBonus`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Price {
    pub base: i32,
    pub bonus: i32,
}

impl Schema for Price {
    const TYPE_NAME: &'static str = "Price";

    fn fields() -> Vec<Box<dyn FieldCodec<Self>>> {
        vec![
            ColumnField::new("Base", |p: &Price| p.base, |p, v| p.base = v).boxed(),
            ColumnField::new("Bonus", |p: &Price| p.bonus, |p, v| p.bonus = v).boxed(),
        ]
    }
}

/// Element of a fixed-count compound list; element `i` reads `ItemId{i}` /
/// `Count{i}`.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Reward {
    pub item_id: i32,
    pub count: i32,
}

impl Schema for Reward {
    const TYPE_NAME: &'static str = "Reward";

    fn fields() -> Vec<Box<dyn FieldCodec<Self>>> {
        vec![
            ColumnField::new("ItemId", |r: &Reward| r.item_id, |r, v| r.item_id = v).boxed(),
            ColumnField::new("Count", |r: &Reward| r.count, |r, v| r.count = v).boxed(),
        ]
    }
}

/// Nested record delegated to its own codec; its cells arrive as one JSON
/// sub-object under the `Effect` column.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Effect {
    pub stat: String,
    pub amount: f32,
}

impl Schema for Effect {
    const TYPE_NAME: &'static str = "Effect";

    fn fields() -> Vec<Box<dyn FieldCodec<Self>>> {
        vec![
            ColumnField::new("Stat", |e: &Effect| e.stat.clone(), |e, v| e.stat = v).boxed(),
            ColumnField::new("Amount", |e: &Effect| e.amount, |e, v| e.amount = v).boxed(),
        ]
    }
}

/// Exercises scalars, an enum column, an inline compound, and a scalar
/// list (`Stat1..Stat3`).
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ItemRow {
    pub id: i32,
    pub active: bool,
    pub name: String,
    pub grade: Grade,
    pub price: Price,
    pub stats: [i32; 3],
    pub weight: f32,
}

impl Schema for ItemRow {
    const TYPE_NAME: &'static str = "ItemRow";

    fn fields() -> Vec<Box<dyn FieldCodec<Self>>> {
        vec![
            ColumnField::new("Id", |r: &ItemRow| r.id, |r, v| r.id = v).boxed(),
            ColumnField::new("Active", |r: &ItemRow| r.active, |r, v| r.active = v).boxed(),
            ColumnField::new("Name", |r: &ItemRow| r.name.clone(), |r, v| r.name = v).boxed(),
            ColumnField::new("Grade", |r: &ItemRow| r.grade, |r, v| r.grade = v).boxed(),
            CompoundField::new("Price", "Price", |r: &ItemRow| &r.price, |r, v| r.price = v)
                .boxed(),
            ColumnListField::new("Stat", |r: &ItemRow| r.stats, |r, v| r.stats = v).boxed(),
            ColumnField::new("Weight", |r: &ItemRow| r.weight, |r, v| r.weight = v).boxed(),
        ]
    }
}

impl Record for ItemRow {
    fn id(&self) -> i32 {
        self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Exercises a child compound and a fixed-count compound list.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PotionRow {
    pub id: i32,
    pub active: bool,
    pub name: String,
    pub effect: Effect,
    pub rewards: [Reward; 2],
}

impl Schema for PotionRow {
    const TYPE_NAME: &'static str = "PotionRow";

    fn fields() -> Vec<Box<dyn FieldCodec<Self>>> {
        vec![
            ColumnField::new("Id", |r: &PotionRow| r.id, |r, v| r.id = v).boxed(),
            ColumnField::new("Active", |r: &PotionRow| r.active, |r, v| r.active = v).boxed(),
            ColumnField::new("Name", |r: &PotionRow| r.name.clone(), |r, v| r.name = v).boxed(),
            ChildCompoundField::new("Effect", |r: &PotionRow| &r.effect, |r, v| r.effect = v)
                .boxed(),
            CompoundListField::new("Reward", |r: &PotionRow| &r.rewards, |r, v| r.rewards = v)
                .boxed(),
        ]
    }
}

impl Record for PotionRow {
    fn id(&self) -> i32 {
        self.id
    }

    fn is_active(&self) -> bool {
        self.active
    }
}

/// Typed records matching [`item_rows`] element for element.
pub fn sample_items() -> Vec<ItemRow> {
    vec![
        ItemRow {
            id: 1,
            active: true,
            name: "Short Sword".to_string(),
            grade: Grade::Common,
            price: Price { base: 120, bonus: 0 },
            stats: [4, 0, 1],
            weight: 3.5,
        },
        ItemRow {
            id: 2,
            active: true,
            name: "Elven Bow".to_string(),
            grade: Grade::Rare,
            price: Price {
                base: 900,
                bonus: 45,
            },
            stats: [2, 7, 3],
            weight: 1.25,
        },
        ItemRow {
            id: 3,
            active: false,
            name: "Cracked Shield".to_string(),
            grade: Grade::Epic,
            price: Price {
                base: 40,
                bonus: -5,
            },
            stats: [0, 0, 9],
            weight: 6.0,
        },
    ]
}

/// Source rows as a spreadsheet export would deliver them: some cells
/// native JSON, some stringly typed.
pub fn item_rows() -> Vec<Row> {
    let rows = [
        json!({
            "Id": 1,
            "Active": "TRUE",
            "Name": "Short Sword",
            "Grade": "Common",
            "PriceBase": "120",
            "PriceBonus": 0,
            "Stat1": 4,
            "Stat2": "0",
            "Stat3": 1,
            "Weight": "3.5",
        }),
        json!({
            "Id": "2",
            "Active": true,
            "Name": "Elven Bow",
            "Grade": 1,
            "PriceBase": 900,
            "PriceBonus": "45",
            "Stat1": "2",
            "Stat2": 7,
            "Stat3": 3,
            "Weight": 1.25,
        }),
        json!({
            "Id": 3,
            "Active": "0",
            "Name": "Cracked Shield",
            "Grade": "Epic",
            "PriceBase": 40,
            "PriceBonus": -5,
            "Stat1": 0,
            "Stat2": 0,
            "Stat3": "9",
            "Weight": 6.0,
        }),
    ];
    rows.into_iter()
        .map(|v| match v {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        })
        .collect()
}

/// Typed records matching [`potion_rows`] element for element.
pub fn sample_potions() -> Vec<PotionRow> {
    vec![
        PotionRow {
            id: 10,
            active: true,
            name: "Minor Healing".to_string(),
            effect: Effect {
                stat: "HP".to_string(),
                amount: 50.0,
            },
            rewards: [
                Reward {
                    item_id: 1,
                    count: 2,
                },
                Reward {
                    item_id: 3,
                    count: 1,
                },
            ],
        },
        PotionRow {
            id: 11,
            active: false,
            name: "Stale Mana".to_string(),
            effect: Effect {
                stat: "MP".to_string(),
                amount: 12.5,
            },
            rewards: [Reward::default(), Reward::default()],
        },
    ]
}

pub fn potion_rows() -> Vec<Row> {
    let rows = [
        json!({
            "Id": 10,
            "Active": 1,
            "Name": "Minor Healing",
            "Effect": { "Stat": "HP", "Amount": "50" },
            "ItemId1": 1,
            "Count1": "2",
            "ItemId2": 3,
            "Count2": 1,
        }),
        json!({
            "Id": "11",
            "Active": "false",
            "Name": "Stale Mana",
            "Effect": { "Stat": "MP", "Amount": 12.5 },
        }),
    ];
    rows.into_iter()
        .map(|v| match v {
            serde_json::Value::Object(map) => map,
            _ => unreachable!(),
        })
        .collect()
}
