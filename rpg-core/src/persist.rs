//! Character persistence.
//!
//! A save holds a flat [`CharacterRecord`]: scalar fields plus catalog ids
//! for gear and spells. Loading rebuilds the character and replays
//! equip/learn through the rules, so derived stats always come from the
//! catalog's current definitions rather than stale copies.

use crate::catalog::Catalog;
use crate::equipment;
use crate::error::RulesError;
use crate::spellcasting;
use crate::world::{AbilityScores, Character, CharacterKind, EntityId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid save format: {0}")]
    InvalidFormat(String),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current save file version.
pub const SAVE_VERSION: u32 = 1;

// ============================================================================
// Records
// ============================================================================

/// Everything needed to rebuild a character, with gear and spells stored
/// as catalog ids.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    pub id: EntityId,
    pub name: String,
    pub race: String,
    pub class_name: String,
    pub level: u8,
    /// Max HP without equipment bonuses. Loading re-adds them.
    pub max_hp: i32,
    pub current_hp: i32,
    #[serde(default)]
    pub max_mana: u32,
    #[serde(default)]
    pub current_mana: u32,
    pub attributes: AbilityScores,
    #[serde(default)]
    pub proficiencies: BTreeSet<String>,
    #[serde(default)]
    pub weapon_id: Option<EntityId>,
    #[serde(default)]
    pub armor_id: Option<EntityId>,
    #[serde(default)]
    pub spell_ids: Vec<EntityId>,
    #[serde(default)]
    pub inventory_ids: Vec<EntityId>,
    #[serde(flatten)]
    pub kind: CharacterKind,
}

/// Flatten a live character into a record.
pub fn to_record(character: &Character) -> CharacterRecord {
    let equipment = character.equipment();
    CharacterRecord {
        id: character.id,
        name: character.name.clone(),
        race: character.race.clone(),
        class_name: character.class_name.clone(),
        level: character.level(),
        max_hp: character.base_max_hp(),
        current_hp: character.current_hp(),
        max_mana: character.max_mana(),
        current_mana: character.current_mana(),
        attributes: *character.ability_scores(),
        proficiencies: character.proficiencies.clone(),
        weapon_id: equipment.weapon.as_ref().map(|w| w.base.id),
        armor_id: equipment.armor.as_ref().map(|a| a.base.id),
        spell_ids: character.known_spells().iter().map(|s| s.id).collect(),
        inventory_ids: character.inventory.items.iter().map(|i| i.id()).collect(),
        kind: character.kind.clone(),
    }
}

/// What a dropped reference pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReferenceKind {
    Weapon,
    Armor,
    Spell,
    Item,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReferenceKind::Weapon => write!(f, "weapon"),
            ReferenceKind::Armor => write!(f, "armor"),
            ReferenceKind::Spell => write!(f, "spell"),
            ReferenceKind::Item => write!(f, "item"),
        }
    }
}

/// A saved id the catalog no longer resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DroppedReference {
    pub kind: ReferenceKind,
    pub id: EntityId,
}

impl From<DroppedReference> for RulesError {
    fn from(dropped: DroppedReference) -> Self {
        RulesError::DanglingReference {
            kind: dropped.kind,
            id: dropped.id,
        }
    }
}

/// A rebuilt character plus any references that had to be dropped.
#[derive(Debug, Clone)]
pub struct LoadedCharacter {
    pub character: Character,
    pub dropped: Vec<DroppedReference>,
}

impl LoadedCharacter {
    pub fn is_complete(&self) -> bool {
        self.dropped.is_empty()
    }

    /// The character, or the first dropped reference as an error.
    pub fn into_strict(self) -> Result<Character, RulesError> {
        match self.dropped.first() {
            Some(dropped) => Err((*dropped).into()),
            None => Ok(self.character),
        }
    }
}

/// Rebuild a character from a record, re-resolving gear and spells.
///
/// Current HP and mana come from the record, clamped to the maxima the
/// rebuilt equipment produces.
pub fn from_record(
    record: CharacterRecord,
    catalog: &(impl Catalog + ?Sized),
) -> Result<LoadedCharacter, RulesError> {
    if record.max_hp < 1 {
        return Err(PersistError::InvalidFormat(format!(
            "max_hp must be at least 1, got {}",
            record.max_hp
        ))
        .into());
    }
    if record.level == 0 {
        return Err(PersistError::InvalidFormat("level must be at least 1".to_string()).into());
    }

    let mut character = Character::from_parts(
        record.id,
        record.name,
        record.race,
        record.class_name,
        record.level,
        record.attributes,
        record.proficiencies,
        record.max_hp,
        record.max_mana,
        record.kind,
    );
    let mut dropped = Vec::new();

    // An equipped id that no longer resolves is reported once, by its slot.
    let equipped = [record.weapon_id, record.armor_id];
    for id in record.inventory_ids {
        match catalog.item_by_id(id) {
            Some(item) => character.inventory.add_item(item),
            None if equipped.contains(&Some(id)) => {}
            None => dropped.push(DroppedReference {
                kind: ReferenceKind::Item,
                id,
            }),
        }
    }

    if let Some(id) = record.weapon_id {
        match catalog.weapon_by_id(id) {
            Some(weapon) => {
                if !character.inventory.contains(id) {
                    character.inventory.add_item(weapon.into());
                }
                equipment::equip(&mut character, id)?;
            }
            None => dropped.push(DroppedReference {
                kind: ReferenceKind::Weapon,
                id,
            }),
        }
    }

    if let Some(id) = record.armor_id {
        match catalog.armor_by_id(id) {
            Some(armor) => {
                if !character.inventory.contains(id) {
                    character.inventory.add_item(armor.into());
                }
                equipment::equip(&mut character, id)?;
            }
            None => dropped.push(DroppedReference {
                kind: ReferenceKind::Armor,
                id,
            }),
        }
    }

    for id in record.spell_ids {
        match catalog.spell_by_id(id) {
            Some(spell) => {
                spellcasting::learn_spell(&mut character, &spell);
            }
            None => dropped.push(DroppedReference {
                kind: ReferenceKind::Spell,
                id,
            }),
        }
    }

    character.hit_points.set_current(record.current_hp);
    character.mana.set_current(record.current_mana);

    for reference in &dropped {
        warn!(
            character = %character.name,
            kind = %reference.kind,
            id = %reference.id,
            "Dropped reference that no longer resolves"
        );
    }

    Ok(LoadedCharacter { character, dropped })
}

// ============================================================================
// Save Files
// ============================================================================

/// Identifier for one save slot. Only alphanumerics, `-` and `_` survive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SaveId(String);

impl SaveId {
    pub fn new(id: impl AsRef<str>) -> Self {
        let sanitized = id
            .as_ref()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                    c
                } else {
                    '_'
                }
            })
            .collect::<String>();
        Self(sanitized)
    }

    /// A fresh id from the current time.
    pub fn generate() -> Self {
        Self(timestamp_now())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SaveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Quick-access fields stored next to the record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterMetadata {
    pub character_name: String,
    pub class_name: String,
    pub level: u8,
}

/// One save file on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCharacter {
    /// Save format version for compatibility checking.
    pub version: u32,
    pub save_id: SaveId,
    pub saved_at: String,
    pub metadata: CharacterMetadata,
    pub record: CharacterRecord,
}

impl SavedCharacter {
    pub fn new(save_id: SaveId, character: &Character) -> Self {
        Self {
            version: SAVE_VERSION,
            save_id,
            saved_at: timestamp_now(),
            metadata: CharacterMetadata {
                character_name: character.name.clone(),
                class_name: character.class_name.clone(),
                level: character.level(),
            },
            record: to_record(character),
        }
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path)?;
        let saved: Self = serde_json::from_str(&content)?;
        check_version(saved.version)?;
        Ok(saved)
    }

    /// Read the metadata without parsing the record.
    pub fn peek_metadata(path: impl AsRef<Path>) -> Result<CharacterMetadata, PersistError> {
        let content = fs::read_to_string(path)?;

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: CharacterMetadata,
        }

        let partial: Partial = serde_json::from_str(&content)?;
        check_version(partial.version)?;
        Ok(partial.metadata)
    }
}

fn check_version(found: u32) -> Result<(), PersistError> {
    if found != SAVE_VERSION {
        return Err(PersistError::VersionMismatch {
            expected: SAVE_VERSION,
            found,
        });
    }
    Ok(())
}

/// Listing entry for one save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub character_name: String,
    pub level: u8,
    pub class_name: String,
    pub locator: PathBuf,
}

/// A directory of `save_<id>.json` files.
#[derive(Debug, Clone)]
pub struct SaveStore {
    dir: PathBuf,
}

impl SaveStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, id: &SaveId) -> PathBuf {
        self.dir.join(format!("save_{id}.json"))
    }

    /// Write (or overwrite) a save, creating the directory if needed.
    pub fn save(&self, id: &SaveId, character: &Character) -> Result<PathBuf, PersistError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(id);
        SavedCharacter::new(id.clone(), character).save_json(&path)?;
        info!(character = %character.name, path = %path.display(), "Saved character");
        Ok(path)
    }

    /// Read a save and rebuild its character against the catalog.
    pub fn load(
        &self,
        id: &SaveId,
        catalog: &(impl Catalog + ?Sized),
    ) -> Result<LoadedCharacter, RulesError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Err(RulesError::not_found("save", id));
        }
        let saved = SavedCharacter::load_json(&path)?;
        let loaded = from_record(saved.record, catalog)?;
        info!(
            character = %loaded.character.name,
            path = %path.display(),
            dropped = loaded.dropped.len(),
            "Loaded character"
        );
        Ok(loaded)
    }

    /// Summaries of every readable save, sorted by character name.
    /// A missing directory lists as empty.
    pub fn list(&self) -> Result<Vec<SaveSummary>, PersistError> {
        if !self.dir.exists() {
            return Ok(Vec::new());
        }

        let mut saves = Vec::new();
        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                match SavedCharacter::peek_metadata(&path) {
                    Ok(metadata) => saves.push(SaveSummary {
                        character_name: metadata.character_name,
                        level: metadata.level,
                        class_name: metadata.class_name,
                        locator: path,
                    }),
                    Err(e) => debug!(path = %path.display(), error = %e, "Skipping unreadable save"),
                }
            }
        }

        saves.sort_by(|a, b| {
            a.character_name
                .cmp(&b.character_name)
                .then_with(|| a.locator.cmp(&b.locator))
        });
        Ok(saves)
    }

    /// Remove a save. Returns false if it didn't exist.
    pub fn delete(&self, id: &SaveId) -> Result<bool, PersistError> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(false);
        }
        fs::remove_file(&path)?;
        Ok(true)
    }
}

/// Seconds since the epoch as a string.
fn timestamp_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", now.as_secs())
}
