use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardKind {
    #[default]
    Normal,
    Bonus,
    Bomb,
    Hidden,
}

impl CardKind {
    pub fn is_special(self) -> bool {
        self != CardKind::Normal
    }
}

/// Picture family drawn on card faces. Cosmetic to the rules.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Fruit,
    Animal,
    Instrument,
}

impl Theme {
    pub const ALL: [Theme; 3] = [Theme::Fruit, Theme::Animal, Theme::Instrument];

    pub fn name(self) -> &'static str {
        match self {
            Theme::Fruit => "Fruit",
            Theme::Animal => "Animal",
            Theme::Instrument => "Instrument",
        }
    }
}

/// Slot on the board: grid cell plus its top-left pixel corner.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub col: u32,
    pub row: u32,
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardFace {
    Down,
    Up,
    Matched,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: i32,
    pub kind: CardKind,
    pub position: Position,
    face_up: bool,
    matched: bool,
    animating: bool,
    flip_count: u32,
}

impl Card {
    pub fn new(id: i32, kind: CardKind) -> Self {
        Card {
            id,
            kind,
            position: Position::default(),
            face_up: false,
            matched: false,
            animating: false,
            flip_count: 0,
        }
    }

    pub fn is_face_up(&self) -> bool {
        self.face_up
    }

    pub fn is_matched(&self) -> bool {
        self.matched
    }

    pub fn is_animating(&self) -> bool {
        self.animating
    }

    pub fn is_bomb(&self) -> bool {
        self.kind == CardKind::Bomb
    }

    pub fn flip_count(&self) -> u32 {
        self.flip_count
    }

    pub fn face(&self) -> CardFace {
        if self.matched {
            CardFace::Matched
        } else if self.face_up {
            CardFace::Up
        } else {
            CardFace::Down
        }
    }

    /// A card accepts a player flip only while face down, unmatched and still.
    pub fn can_flip(&self) -> bool {
        !self.matched && !self.animating && !self.face_up
    }

    /// Turns the card face up. Returns false when nothing changed.
    pub fn flip_up(&mut self) -> bool {
        if self.matched || self.face_up {
            return false;
        }
        self.face_up = true;
        self.flip_count += 1;
        true
    }

    /// Turns the card face down. Matched cards stay up for good.
    pub fn flip_down(&mut self) -> bool {
        if self.matched || !self.face_up {
            return false;
        }
        self.face_up = false;
        self.flip_count += 1;
        true
    }

    pub fn set_matched(&mut self) {
        self.matched = true;
        self.face_up = true;
        self.animating = false;
    }

    pub fn set_animating(&mut self, animating: bool) {
        self.animating = animating;
    }

    /// Bombs live in their own id space and never pair with anything.
    pub fn is_match_with(&self, other: &Card) -> bool {
        !self.is_bomb() && !other.is_bomb() && self.id == other.id
    }

    pub fn reset(&mut self) {
        self.face_up = false;
        self.matched = false;
        self.animating = false;
        self.flip_count = 0;
    }
}
