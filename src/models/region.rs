use serde::{Deserialize, Serialize};

/// Rectangular area in frame pixel coordinates
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a new rect from top-left corner and dimensions
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Validate rect dimensions
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }

    /// Get the end coordinates
    pub fn x2(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn y2(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Check if rect contains a point
    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.x2() && y >= self.y && y < self.y2()
    }

    /// Check if the rect lies fully inside a frame of the given size
    pub fn within_frame(&self, frame_width: u32, frame_height: u32) -> bool {
        self.is_valid()
            && self.x >= 0
            && self.y >= 0
            && self.x2() <= frame_width as i32
            && self.y2() <= frame_height as i32
    }

    /// Clip the rect to a frame of the given size
    ///
    /// Returns None when nothing of the rect remains inside the frame.
    pub fn clamped(&self, frame_width: u32, frame_height: u32) -> Option<Rect> {
        let x1 = self.x.max(0);
        let y1 = self.y.max(0);
        let x2 = self.x2().min(frame_width as i32);
        let y2 = self.y2().min(frame_height as i32);

        if x2 <= x1 || y2 <= y1 {
            return None;
        }

        Some(Rect {
            x: x1,
            y: y1,
            width: (x2 - x1) as u32,
            height: (y2 - y1) as u32,
        })
    }
}

/// Slot family on the draft board
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Ultimate,
    Standard,
}

/// Who a board region belongs to
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RegionOwner {
    /// Shared draft-pool slot contributed by the hero at board position `hero`
    Pool { hero: u8 },
    /// Committed slot of the drafting player at seat `player`
    Participant { player: u8 },
}

/// One recognizable slot on the draft board
///
/// `slot` indexes within the owner's group: pool slot 0 is the hero's
/// ultimate, 1-3 its standard abilities; participant slots run 0-3 with
/// slot 3 reserved for the ultimate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Region {
    pub rect: Rect,
    pub owner: RegionOwner,
    pub slot: u8,
    pub kind: SlotKind,
}

impl Region {
    pub fn is_pool(&self) -> bool {
        matches!(self.owner, RegionOwner::Pool { .. })
    }

    pub fn is_committed(&self) -> bool {
        matches!(self.owner, RegionOwner::Participant { .. })
    }

    /// Board position of the hero that contributes this pool slot
    pub fn pool_hero(&self) -> Option<u8> {
        match self.owner {
            RegionOwner::Pool { hero } => Some(hero),
            RegionOwner::Participant { .. } => None,
        }
    }

    /// Seat of the player that owns this committed slot
    pub fn participant(&self) -> Option<u8> {
        match self.owner {
            RegionOwner::Participant { player } => Some(player),
            RegionOwner::Pool { .. } => None,
        }
    }

    /// A pool ultimate slot identifies the hero model at its board position
    pub fn is_defining(&self) -> bool {
        self.is_pool() && self.kind == SlotKind::Ultimate
    }
}

/// Number of hero board positions (10 drafting + 2 bonus)
pub const HERO_POSITIONS: u8 = 12;
/// Number of drafting players
pub const DRAFTING_PLAYERS: u8 = 10;
/// Committed slots per player
pub const SLOTS_PER_PLAYER: u8 = 4;
/// Standard pool slots per hero
pub const STANDARD_SLOTS_PER_HERO: u8 = 3;

/// Full set of board regions for one resolution profile
///
/// Deserialized from a manifest file; `validate` enforces the exact board
/// layout before the scanner will accept it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegionManifest {
    /// Frame resolution the coordinates were measured against
    pub width: u32,
    pub height: u32,
    pub regions: Vec<Region>,
}

impl RegionManifest {
    /// Expected region counts: 12 ultimates, 36 standards, 40 committed
    pub const ULTIMATE_COUNT: usize = HERO_POSITIONS as usize;
    pub const STANDARD_COUNT: usize =
        HERO_POSITIONS as usize * STANDARD_SLOTS_PER_HERO as usize;
    pub const COMMITTED_COUNT: usize =
        DRAFTING_PLAYERS as usize * SLOTS_PER_PLAYER as usize;

    /// Draft-pool regions in manifest order
    pub fn pool_regions(&self) -> Vec<Region> {
        self.regions.iter().filter(|r| r.is_pool()).copied().collect()
    }

    /// Committed-slot regions in manifest order
    pub fn committed_regions(&self) -> Vec<Region> {
        self.regions
            .iter()
            .filter(|r| r.is_committed())
            .copied()
            .collect()
    }

    /// The defining (pool ultimate) region for a hero position
    pub fn defining_region(&self, hero: u8) -> Option<Region> {
        self.regions
            .iter()
            .find(|r| r.is_defining() && r.pool_hero() == Some(hero))
            .copied()
    }

    /// Check the manifest describes the full board exactly once
    pub fn validate(&self) -> Result<(), String> {
        if self.width == 0 || self.height == 0 {
            return Err("manifest resolution must be non-zero".to_string());
        }

        let mut ultimates = 0usize;
        let mut standards = 0usize;
        let mut committed = 0usize;

        for region in &self.regions {
            if !region.rect.within_frame(self.width, self.height) {
                return Err(format!(
                    "region {:?} falls outside the {}x{} frame",
                    region.rect, self.width, self.height
                ));
            }

            match region.owner {
                RegionOwner::Pool { hero } => {
                    if hero >= HERO_POSITIONS {
                        return Err(format!("pool region with invalid hero position {}", hero));
                    }
                    match region.kind {
                        SlotKind::Ultimate => {
                            if region.slot != 0 {
                                return Err(format!(
                                    "pool ultimate for hero {} must use slot 0, got {}",
                                    hero, region.slot
                                ));
                            }
                            ultimates += 1;
                        }
                        SlotKind::Standard => {
                            if region.slot == 0 || region.slot > STANDARD_SLOTS_PER_HERO {
                                return Err(format!(
                                    "pool standard for hero {} must use slots 1-{}, got {}",
                                    hero, STANDARD_SLOTS_PER_HERO, region.slot
                                ));
                            }
                            standards += 1;
                        }
                    }
                }
                RegionOwner::Participant { player } => {
                    if player >= DRAFTING_PLAYERS {
                        return Err(format!("committed region with invalid seat {}", player));
                    }
                    if region.slot >= SLOTS_PER_PLAYER {
                        return Err(format!(
                            "committed slot for seat {} out of range: {}",
                            player, region.slot
                        ));
                    }
                    let expected = if region.slot == SLOTS_PER_PLAYER - 1 {
                        SlotKind::Ultimate
                    } else {
                        SlotKind::Standard
                    };
                    if region.kind != expected {
                        return Err(format!(
                            "committed slot {} for seat {} must be {:?}",
                            region.slot, player, expected
                        ));
                    }
                    committed += 1;
                }
            }
        }

        if ultimates != Self::ULTIMATE_COUNT {
            return Err(format!(
                "expected {} ultimate regions, found {}",
                Self::ULTIMATE_COUNT,
                ultimates
            ));
        }
        if standards != Self::STANDARD_COUNT {
            return Err(format!(
                "expected {} standard regions, found {}",
                Self::STANDARD_COUNT,
                standards
            ));
        }
        if committed != Self::COMMITTED_COUNT {
            return Err(format!(
                "expected {} committed regions, found {}",
                Self::COMMITTED_COUNT,
                committed
            ));
        }

        // One defining slot per hero position
        for hero in 0..HERO_POSITIONS {
            if self.defining_region(hero).is_none() {
                return Err(format!("missing ultimate region for hero position {}", hero));
            }
        }

        Ok(())
    }
}
