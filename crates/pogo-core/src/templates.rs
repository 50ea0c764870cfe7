//! # Template Catalog
//!
//! Read-only game master templates, downloaded once per session. Only the
//! species settings are modelled; other template kinds carry no settings
//! and are filtered out of lookups.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::snapshot::Snapshot;
use crate::types::{FamilyId, PokemonId};

/// Per-species settings from the template catalog.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PokemonSettings {
    pub pokemon_id: PokemonId,
    pub family_id: FamilyId,
    /// Candy needed to evolve, 0 if the species does not evolve.
    pub candy_to_evolve: i32,
    pub parent_pokemon_id: PokemonId,
}

/// One downloaded template.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ItemTemplate {
    pub template_id: String,
    pub pokemon_settings: Option<PokemonSettings>,
}

/// The downloaded template set.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplateCatalog {
    #[serde(default)]
    pub item_templates: Vec<ItemTemplate>,
}

impl TemplateCatalog {
    pub fn new(item_templates: Vec<ItemTemplate>) -> Self {
        TemplateCatalog { item_templates }
    }

    /// Species settings with a real family.
    pub fn pokemon_settings(&self) -> impl Iterator<Item = &PokemonSettings> {
        self.item_templates
            .iter()
            .filter_map(|t| t.pokemon_settings.as_ref())
            .filter(|s| s.family_id.is_set())
    }

    pub fn settings_for(&self, pokemon_id: PokemonId) -> Option<&PokemonSettings> {
        self.pokemon_settings().find(|s| s.pokemon_id == pokemon_id)
    }

    pub fn family_of(&self, pokemon_id: PokemonId) -> Option<FamilyId> {
        self.settings_for(pokemon_id).map(|s| s.family_id)
    }

    /// Species belonging to a family, in catalog order.
    pub fn family_members(&self, family_id: FamilyId) -> Vec<PokemonId> {
        self.pokemon_settings()
            .filter(|s| s.family_id == family_id)
            .map(|s| s.pokemon_id)
            .collect()
    }

    /// How many evolutions of `pokemon_id` the snapshot's candy pays for.
    pub fn evolutions_affordable(
        &self,
        snapshot: &Snapshot,
        pokemon_id: PokemonId,
    ) -> CoreResult<i32> {
        let settings = self
            .settings_for(pokemon_id)
            .ok_or(CoreError::TemplateNotFound(pokemon_id.0))?;

        if settings.candy_to_evolve <= 0 {
            return Ok(0);
        }

        let candy = snapshot.family_candy(settings.family_id).max(0);
        Ok(candy / settings.candy_to_evolve)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::InventoryRecord;
    use crate::types::PokemonFamily;

    fn species(id: u32, family: u32, candy: i32) -> ItemTemplate {
        ItemTemplate {
            template_id: format!("V{id:04}_POKEMON"),
            pokemon_settings: Some(PokemonSettings {
                pokemon_id: PokemonId(id),
                family_id: FamilyId(family),
                candy_to_evolve: candy,
                parent_pokemon_id: PokemonId(0),
            }),
        }
    }

    fn catalog() -> TemplateCatalog {
        TemplateCatalog::new(vec![
            species(16, 16, 12),
            species(17, 16, 50),
            species(18, 16, 0),
            ItemTemplate {
                template_id: "ITEM_POKE_BALL".into(),
                pokemon_settings: None,
            },
            species(999, 0, 0),
        ])
    }

    #[test]
    fn test_unset_family_filtered() {
        let catalog = catalog();
        assert_eq!(catalog.pokemon_settings().count(), 3);
        assert!(catalog.settings_for(PokemonId(999)).is_none());
    }

    #[test]
    fn test_family_lookup() {
        let catalog = catalog();
        assert_eq!(catalog.family_of(PokemonId(17)), Some(FamilyId(16)));
        assert_eq!(
            catalog.family_members(FamilyId(16)),
            vec![PokemonId(16), PokemonId(17), PokemonId(18)]
        );
    }

    #[test]
    fn test_evolutions_affordable() {
        let catalog = catalog();
        let snapshot = Snapshot::from_records(vec![InventoryRecord::pokemon_family(PokemonFamily {
            family_id: FamilyId(16),
            candy: 40,
        })]);

        assert_eq!(catalog.evolutions_affordable(&snapshot, PokemonId(16)).unwrap(), 3);
        assert_eq!(catalog.evolutions_affordable(&snapshot, PokemonId(17)).unwrap(), 0);
        assert_eq!(catalog.evolutions_affordable(&snapshot, PokemonId(18)).unwrap(), 0);
        assert!(matches!(
            catalog.evolutions_affordable(&snapshot, PokemonId(1)),
            Err(CoreError::TemplateNotFound(1))
        ));
    }
}
