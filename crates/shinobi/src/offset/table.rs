use serde::Serialize;
use strum::{Display, EnumIter, IntoStaticStr};
use tracing::debug;

use crate::error::Result;
use crate::memory::ReadMemory;
use crate::offset::{GameVersion, PointerChain};

use super::version::checked_offset;

/// Distance of each debug flag from the start of the debug flag block
mod debug_flags {
    pub const NO_GOODS_CONSUME: u64 = 0;
    pub const NO_RESOURCE_ITEM_CONSUME: u64 = 1;
    pub const PLAYER_HIDE: u64 = 6;
    pub const ALL_NO_DAMAGE: u64 = 9;
    pub const ALL_NO_UPDATE_AI: u64 = 13;
}

/// Distance of the second collision debug word from the debug render block
const DEBUG_RENDER8: u64 = 0xC;

const QUITOUT_CHAIN: [u64; 1] = [0x23C];
const POSITION_CHAIN: [u64; 3] = [0x48, 0x28, 0x80];
const IGT_CHAIN: [u64; 1] = [0x9C];

/// Where a field lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Absolute(u64),
    Chain(PointerChain),
}

impl Target {
    pub fn resolve<R: ReadMemory>(&self, reader: &R) -> Result<u64> {
        match self {
            Target::Absolute(address) => Ok(*address),
            Target::Chain(chain) => chain.resolve(reader),
        }
    }
}

/// Semantic names of every patched field
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, EnumIter, IntoStaticStr, Display,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum Field {
    RenderWorld,
    DebugRender0,
    DebugRender8,
    PlayerHide,
    AllNoUpdateAi,
    AllNoDamage,
    NoGoodsConsume,
    NoResourceItemConsume,
    Quitout,
    Position,
    Igt,
}

/// Absolute addresses and chains for one build loaded at one module base
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OffsetTable {
    pub version: GameVersion,
    pub module_base: u64,
    pub render_world: u64,
    pub debug_render0: u64,
    pub debug_render8: u64,
    pub player_hide: u64,
    pub all_no_update_ai: u64,
    pub all_no_damage: u64,
    pub no_goods_consume: u64,
    pub no_resource_item_consume: u64,
    pub quitout: PointerChain,
    pub position: PointerChain,
    /// In-game time in milliseconds (u32)
    pub igt: PointerChain,
}

impl OffsetTable {
    pub fn new(version: GameVersion, module_base: u64) -> Result<Self> {
        let base = version.base_addresses().with_module_base(module_base)?;
        let flag = |delta: u64, what: &str| checked_offset(base.debug_flags, delta, what);

        let table = Self {
            version,
            module_base,
            render_world: base.render_world,
            debug_render0: base.debug_render,
            debug_render8: checked_offset(base.debug_render, DEBUG_RENDER8, "debug_render8")?,
            player_hide: flag(debug_flags::PLAYER_HIDE, "player_hide")?,
            all_no_update_ai: flag(debug_flags::ALL_NO_UPDATE_AI, "all_no_update_ai")?,
            all_no_damage: flag(debug_flags::ALL_NO_DAMAGE, "all_no_damage")?,
            no_goods_consume: flag(debug_flags::NO_GOODS_CONSUME, "no_goods_consume")?,
            no_resource_item_consume: flag(
                debug_flags::NO_RESOURCE_ITEM_CONSUME,
                "no_resource_item_consume",
            )?,
            quitout: PointerChain::new(base.quitout, QUITOUT_CHAIN)?,
            position: PointerChain::new(base.player_position, POSITION_CHAIN)?,
            igt: PointerChain::new(base.igt, IGT_CHAIN)?,
        };

        debug!(
            "Offset table for {} at module base 0x{:X}: render_world=0x{:X}, debug_flags=0x{:X}",
            version, module_base, table.render_world, base.debug_flags
        );
        Ok(table)
    }

    pub fn entry(&self, field: Field) -> Target {
        match field {
            Field::RenderWorld => Target::Absolute(self.render_world),
            Field::DebugRender0 => Target::Absolute(self.debug_render0),
            Field::DebugRender8 => Target::Absolute(self.debug_render8),
            Field::PlayerHide => Target::Absolute(self.player_hide),
            Field::AllNoUpdateAi => Target::Absolute(self.all_no_update_ai),
            Field::AllNoDamage => Target::Absolute(self.all_no_damage),
            Field::NoGoodsConsume => Target::Absolute(self.no_goods_consume),
            Field::NoResourceItemConsume => Target::Absolute(self.no_resource_item_consume),
            Field::Quitout => Target::Chain(self.quitout.clone()),
            Field::Position => Target::Chain(self.position.clone()),
            Field::Igt => Target::Chain(self.igt.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::layout::DEFAULT_IMAGE_BASE;
    use strum::IntoEnumIterator;

    #[test]
    fn test_table_1_02_matches_known_addresses() {
        let table = OffsetTable::new(GameVersion::V1_02_0, DEFAULT_IMAGE_BASE).unwrap();

        assert_eq!(table.render_world, 0x1439007C8);
        assert_eq!(table.debug_render0, 0x143B65BC0);
        assert_eq!(table.debug_render8, 0x143B65BCC);
        assert_eq!(table.player_hide, 0x143B67F5F);
        assert_eq!(table.all_no_update_ai, 0x143B67F66);
        assert_eq!(table.all_no_damage, 0x143B67F62);
        assert_eq!(table.no_goods_consume, 0x143B67F59);
        assert_eq!(table.no_resource_item_consume, 0x143B67F5A);
        assert_eq!(table.quitout.base(), 0x143B55048);
        assert_eq!(table.quitout.offsets(), &[0x23C]);
        assert_eq!(table.position.base(), 0x143B67DF0);
        assert_eq!(table.position.offsets(), &[0x48, 0x28, 0x80]);
        assert_eq!(table.igt.base(), 0x143B47CF0);
        assert_eq!(table.igt.offsets(), &[0x9C]);
    }

    #[test]
    fn test_table_follows_relocated_module() {
        let relocated = DEFAULT_IMAGE_BASE + 0x1000_0000;
        let a = OffsetTable::new(GameVersion::V1_06_0, DEFAULT_IMAGE_BASE).unwrap();
        let b = OffsetTable::new(GameVersion::V1_06_0, relocated).unwrap();

        assert_eq!(b.render_world - a.render_world, 0x1000_0000);
        assert_eq!(b.position.base() - a.position.base(), 0x1000_0000);
        assert_eq!(b.position.offsets(), a.position.offsets());
    }

    #[test]
    fn test_builds_differ() {
        let old = OffsetTable::new(GameVersion::V1_02_0, DEFAULT_IMAGE_BASE).unwrap();
        let new = OffsetTable::new(GameVersion::V1_06_0, DEFAULT_IMAGE_BASE).unwrap();
        assert_ne!(old.player_hide, new.player_hide);
    }

    #[test]
    fn test_entry_shapes() {
        let table = OffsetTable::new(GameVersion::V1_04_0, DEFAULT_IMAGE_BASE).unwrap();
        for field in Field::iter() {
            let entry = table.entry(field);
            match field {
                Field::Quitout | Field::Position | Field::Igt => {
                    assert!(matches!(entry, Target::Chain(_)), "{field}")
                }
                _ => assert!(matches!(entry, Target::Absolute(_)), "{field}"),
            }
        }
    }

    #[test]
    fn test_table_rejects_overflowing_module_base() {
        let err = OffsetTable::new(GameVersion::V1_02_0, u64::MAX).unwrap_err();
        assert!(matches!(err, crate::error::Error::InvalidOffset(_)));

        // Base entries fit but the derived debug flag addresses do not
        let debug_flags = GameVersion::V1_02_0.base_addresses().debug_flags;
        let err = OffsetTable::new(GameVersion::V1_02_0, u64::MAX - debug_flags - 4).unwrap_err();
        assert!(err.to_string().contains("player_hide"), "{err}");
    }

    #[test]
    fn test_absolute_target_resolves_without_reads() {
        let memory = crate::memory::MockMemory::builder().build();
        let target = Target::Absolute(0x1234);
        assert_eq!(target.resolve(&memory).unwrap(), 0x1234);
        assert_eq!(memory.reads(), 0);
    }
}
