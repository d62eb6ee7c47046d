//! Unit-type and ability classification

use crate::core::types::{AbilityId, UnitTypeId};

pub fn is_worker(unit_type: UnitTypeId) -> bool {
    matches!(
        unit_type,
        UnitTypeId::TERRAN_SCV | UnitTypeId::PROTOSS_PROBE | UnitTypeId::ZERG_DRONE
    )
}

pub fn is_townhall(unit_type: UnitTypeId) -> bool {
    matches!(
        unit_type,
        UnitTypeId::PROTOSS_NEXUS
            | UnitTypeId::TERRAN_COMMANDCENTER
            | UnitTypeId::TERRAN_COMMANDCENTERFLYING
            | UnitTypeId::TERRAN_ORBITALCOMMAND
            | UnitTypeId::TERRAN_ORBITALCOMMANDFLYING
            | UnitTypeId::TERRAN_PLANETARYFORTRESS
            | UnitTypeId::ZERG_HATCHERY
            | UnitTypeId::ZERG_LAIR
            | UnitTypeId::ZERG_HIVE
    )
}

pub fn is_mineral_patch(unit_type: UnitTypeId) -> bool {
    matches!(
        unit_type,
        UnitTypeId::NEUTRAL_BATTLESTATIONMINERALFIELD750
            | UnitTypeId::NEUTRAL_BATTLESTATIONMINERALFIELD
            | UnitTypeId::NEUTRAL_LABMINERALFIELD750
            | UnitTypeId::NEUTRAL_LABMINERALFIELD
            | UnitTypeId::NEUTRAL_MINERALFIELD750
            | UnitTypeId::NEUTRAL_MINERALFIELD
            | UnitTypeId::NEUTRAL_PURIFIERMINERALFIELD750
            | UnitTypeId::NEUTRAL_PURIFIERMINERALFIELD
            | UnitTypeId::NEUTRAL_PURIFIERRICHMINERALFIELD750
            | UnitTypeId::NEUTRAL_PURIFIERRICHMINERALFIELD
            | UnitTypeId::NEUTRAL_RICHMINERALFIELD750
            | UnitTypeId::NEUTRAL_RICHMINERALFIELD
    )
}

pub fn is_geyser(unit_type: UnitTypeId) -> bool {
    matches!(
        unit_type,
        UnitTypeId::NEUTRAL_VESPENEGEYSER
            | UnitTypeId::NEUTRAL_PROTOSSVESPENEGEYSER
            | UnitTypeId::NEUTRAL_SPACEPLATFORMGEYSER
            | UnitTypeId::NEUTRAL_PURIFIERVESPENEGEYSER
            | UnitTypeId::NEUTRAL_SHAKURASVESPENEGEYSER
            | UnitTypeId::NEUTRAL_RICHVESPENEGEYSER
    )
}

/// Structures workers harvest vespene from
pub fn is_gas_structure(unit_type: UnitTypeId) -> bool {
    matches!(
        unit_type,
        UnitTypeId::PROTOSS_ASSIMILATOR
            | UnitTypeId::TERRAN_REFINERY
            | UnitTypeId::ZERG_EXTRACTOR
            | UnitTypeId::PROTOSS_ASSIMILATORRICH
            | UnitTypeId::TERRAN_REFINERYRICH
            | UnitTypeId::ZERG_EXTRACTORRICH
    )
}

/// Protoss gas structures leave their builder standing after placement
pub fn strands_builder(unit_type: UnitTypeId) -> bool {
    matches!(
        unit_type,
        UnitTypeId::PROTOSS_ASSIMILATOR | UnitTypeId::PROTOSS_ASSIMILATORRICH
    )
}

pub fn is_defense_structure(unit_type: UnitTypeId) -> bool {
    matches!(
        unit_type,
        UnitTypeId::PROTOSS_PHOTONCANNON
            | UnitTypeId::TERRAN_BUNKER
            | UnitTypeId::TERRAN_MISSILETURRET
            | UnitTypeId::ZERG_SPINECRAWLER
            | UnitTypeId::ZERG_SPORECRAWLER
    )
}

pub fn can_blink(unit_type: UnitTypeId) -> bool {
    unit_type == UnitTypeId::PROTOSS_STALKER
}

/// Abilities that place a gas structure on a geyser
pub fn is_gas_building_ability(ability: AbilityId) -> bool {
    matches!(
        ability,
        AbilityId::BUILD_ASSIMILATOR | AbilityId::BUILD_EXTRACTOR | AbilityId::BUILD_REFINERY
    )
}

/// Abilities that make a worker construct a structure
pub fn is_build_ability(ability: AbilityId) -> bool {
    ability.name().is_some_and(|name| name.starts_with("BUILD_"))
}
