//! Round-trip tests: encode a realistic object graph, decode it with the test reader and compare
//! against the source values.

mod common;

use flatscope::prelude::*;
use uguid::guid;

#[derive(Debug, Clone, Copy, PartialEq)]
struct Vec3 {
    x: f32,
    y: f32,
    z: f32,
}

impl Struct for Vec3 {
    const SIZE: usize = 12;
    const ALIGN: usize = 4;

    fn write_fields(&self, writer: &mut StructWriter<'_>) -> Result<()> {
        writer.field(self.x)?;
        writer.field(self.y)?;
        writer.field(self.z)
    }
}

/// `struct Stat { id: ubyte; value: double; }`, 16 bytes aligned to 8
#[derive(Debug, Clone, Copy, PartialEq)]
struct Stat {
    id: u8,
    value: f64,
}

impl Struct for Stat {
    const SIZE: usize = 16;
    const ALIGN: usize = 8;

    fn write_fields(&self, writer: &mut StructWriter<'_>) -> Result<()> {
        writer.field(self.id)?;
        writer.field(self.value)
    }
}

struct Weapon {
    name: String,
    damage: i16,
}

impl Serialize for Weapon {
    fn serialize(&self, writer: &mut FlatWriter<'_>) -> Result<()> {
        writer.string(4, &self.name)?;
        writer.scalar(6, self.damage, 0)
    }
}

struct Shield {
    armor: u32,
}

impl Serialize for Shield {
    fn serialize(&self, writer: &mut FlatWriter<'_>) -> Result<()> {
        writer.scalar(4, self.armor, 0)
    }
}

enum Equipment {
    Unequipped,
    Weapon(Weapon),
    Shield(Shield),
}

impl SerializeUnion for Equipment {
    fn union_type(&self) -> u8 {
        match self {
            Equipment::Unequipped => 0,
            Equipment::Weapon(_) => 1,
            Equipment::Shield(_) => 2,
        }
    }

    fn serialize_variant(&self, _union_type: u8, writer: &mut FlatWriter<'_>) -> Result<()> {
        match self {
            Equipment::Unequipped => Ok(()),
            Equipment::Weapon(weapon) => weapon.serialize(writer),
            Equipment::Shield(shield) => shield.serialize(writer),
        }
    }
}

struct Item {
    label: String,
    equipped: Equipment,
}

impl Serialize for Item {
    fn serialize(&self, writer: &mut FlatWriter<'_>) -> Result<()> {
        writer.string(4, &self.label)?;
        // discriminant at 6
        writer.union(8, &self.equipped)
    }
}

struct Inventory {
    items: Vec<Item>,
}

impl Serialize for Inventory {
    fn serialize(&self, writer: &mut FlatWriter<'_>) -> Result<()> {
        writer.vector_of_tables(4, &self.items)
    }
}

struct Monster {
    name: String,
    inventory: Option<Inventory>,
    tags: Vec<String>,
    loot: Vec<u32>,
    stats: Vec<Stat>,
    path: Vec<[f32; 2]>,
    hp: i16,
    mana: Option<i16>,
    position: Option<Vec3>,
    id: Option<uguid::Guid>,
    hostile: bool,
}

impl Monster {
    const VT_NAME: VOffset = 4;
    const VT_INVENTORY: VOffset = 6;
    const VT_TAGS: VOffset = 8;
    const VT_LOOT: VOffset = 10;
    const VT_STATS: VOffset = 12;
    const VT_PATH: VOffset = 14;
    const VT_HP: VOffset = 16;
    const VT_MANA: VOffset = 18;
    const VT_POSITION: VOffset = 20;
    const VT_ID: VOffset = 22;
    const VT_HOSTILE: VOffset = 24;

    fn bare(name: &str) -> Self {
        Self {
            name: name.to_string(),
            inventory: None,
            tags: Vec::new(),
            loot: Vec::new(),
            stats: Vec::new(),
            path: Vec::new(),
            hp: 100,
            mana: None,
            position: None,
            id: None,
            hostile: false,
        }
    }
}

impl Serialize for Monster {
    fn serialize(&self, writer: &mut FlatWriter<'_>) -> Result<()> {
        writer.string(Self::VT_NAME, &self.name)?;
        writer.table_opt(Self::VT_INVENTORY, self.inventory.as_ref())?;
        writer.vector_of_strings(Self::VT_TAGS, &self.tags)?;
        writer.vector_of_scalars(Self::VT_LOOT, &self.loot)?;
        writer.vector_of_structs(Self::VT_STATS, &self.stats)?;
        writer.vector_of_native_structs(Self::VT_PATH, &self.path)?;

        writer.scalar(Self::VT_HP, self.hp, 100)?;
        writer.scalar_opt(Self::VT_MANA, self.mana)?;
        writer.struct_opt(Self::VT_POSITION, self.position.as_ref())?;
        writer.native_struct_opt(Self::VT_ID, self.id.as_ref())?;
        writer.scalar(Self::VT_HOSTILE, self.hostile, false)
    }
}

fn orc() -> Monster {
    Monster {
        name: "Orc".to_string(),
        inventory: Some(Inventory {
            items: vec![
                Item {
                    label: "main hand".to_string(),
                    equipped: Equipment::Weapon(Weapon {
                        name: "Axe".to_string(),
                        damage: 12,
                    }),
                },
                Item {
                    label: "off hand".to_string(),
                    equipped: Equipment::Shield(Shield { armor: 40 }),
                },
                Item {
                    label: "belt".to_string(),
                    equipped: Equipment::Unequipped,
                },
            ],
        }),
        tags: vec!["green".to_string(), "loud".to_string()],
        loot: vec![10, 20, 30],
        stats: vec![
            Stat { id: 1, value: 0.5 },
            Stat {
                id: 2,
                value: -4.25,
            },
        ],
        path: vec![[0.0, 1.0], [2.0, 3.0], [4.0, 5.0]],
        hp: 300,
        mana: Some(0),
        position: Some(Vec3 {
            x: 1.0,
            y: 2.0,
            z: 3.0,
        }),
        id: Some(guid!("01234567-89ab-cdef-0123-456789abcdef")),
        hostile: true,
    }
}

#[test]
fn monster_round_trip() -> Result<()> {
    let bytes = write_flatbuffer(&orc())?;
    let monster = common::root(&bytes)?;

    assert_eq!(monster.string(Monster::VT_NAME)?, Some("Orc"));
    assert_eq!(monster.scalar::<i16>(Monster::VT_HP, 100)?, 300);
    assert_eq!(monster.scalar::<i16>(Monster::VT_MANA, 7)?, 0);
    assert!(monster.scalar::<bool>(Monster::VT_HOSTILE, false)?);

    let tags = monster.vector(Monster::VT_TAGS)?.expect("tags");
    assert_eq!(tags.strings()?, vec!["green", "loud"]);

    let loot = monster.vector(Monster::VT_LOOT)?.expect("loot");
    assert_eq!(loot.scalars::<u32>()?, vec![10, 20, 30]);

    let stats = monster.vector(Monster::VT_STATS)?.expect("stats");
    assert_eq!(stats.len(), 2);
    let second = stats.element_bytes(1, Stat::SIZE)?;
    assert_eq!(second[0], 2);
    assert_eq!(&second[8..16], &(-4.25f64).to_le_bytes());

    let path = monster.vector(Monster::VT_PATH)?.expect("path");
    assert_eq!(path.len(), 3);
    let last = path.element_bytes(2, 8)?;
    assert_eq!(&last[0..4], &4.0f32.to_le_bytes());
    assert_eq!(&last[4..8], &5.0f32.to_le_bytes());

    let position = monster.bytes(Monster::VT_POSITION, Vec3::SIZE)?.expect("position");
    assert_eq!(&position[4..8], &2.0f32.to_le_bytes());

    let id = monster.bytes(Monster::VT_ID, 16)?.expect("id");
    assert_eq!(id, &guid!("01234567-89ab-cdef-0123-456789abcdef").to_bytes());

    Ok(())
}

#[test]
fn nested_vector_of_tables_with_unions() -> Result<()> {
    let bytes = write_flatbuffer(&orc())?;
    let monster = common::root(&bytes)?;

    let inventory = monster.table(Monster::VT_INVENTORY)?.expect("inventory");
    let items = inventory.vector(4)?.expect("items");
    assert_eq!(items.len(), 3);

    let main_hand = items.table(0)?;
    assert_eq!(main_hand.string(4)?, Some("main hand"));
    assert_eq!(main_hand.scalar::<u8>(6, 0)?, 1);
    let axe = main_hand.table(8)?.expect("weapon");
    assert_eq!(axe.string(4)?, Some("Axe"));
    assert_eq!(axe.scalar::<i16>(6, 0)?, 12);

    let off_hand = items.table(1)?;
    assert_eq!(off_hand.string(4)?, Some("off hand"));
    assert_eq!(off_hand.scalar::<u8>(6, 0)?, 2);
    let shield = off_hand.table(8)?.expect("shield");
    assert_eq!(shield.scalar::<u32>(4, 0)?, 40);

    let belt = items.table(2)?;
    assert_eq!(belt.string(4)?, Some("belt"));
    assert_eq!(belt.scalar::<u8>(6, 0)?, 0);
    assert!(belt.table(8)?.is_none());

    Ok(())
}

#[test]
fn unset_optionals_decode_to_defaults() -> Result<()> {
    let bytes = write_flatbuffer(&Monster::bare("Imp"))?;
    let monster = common::root(&bytes)?;

    assert_eq!(monster.string(Monster::VT_NAME)?, Some("Imp"));
    assert!(monster.table(Monster::VT_INVENTORY)?.is_none());
    assert!(monster.vector(Monster::VT_TAGS)?.is_none());
    assert!(monster.vector(Monster::VT_LOOT)?.is_none());
    assert!(!monster.is_present(Monster::VT_MANA)?);
    assert!(!monster.is_present(Monster::VT_POSITION)?);
    assert!(!monster.is_present(Monster::VT_ID)?);
    assert_eq!(monster.scalar::<i16>(Monster::VT_MANA, 50)?, 50);

    // name reference, hp and hostile are the only object bytes
    assert_eq!(monster.object_len()?, 4 + 2 + 1);
    Ok(())
}

#[test]
fn compact_config_elides_defaults() -> Result<()> {
    let monster = Monster::bare("Imp");

    let full = write_flatbuffer(&monster)?;
    let compact = write_flatbuffer_with(&monster, WriterConfig::compact())?;
    assert!(compact.len() < full.len());

    let decoded = common::root(&compact)?;
    assert!(!decoded.is_present(Monster::VT_HP)?);
    assert!(!decoded.is_present(Monster::VT_HOSTILE)?);
    assert_eq!(decoded.scalar::<i16>(Monster::VT_HP, 100)?, 100);
    assert!(!decoded.scalar::<bool>(Monster::VT_HOSTILE, false)?);
    Ok(())
}

#[test]
fn file_identifier() -> Result<()> {
    let config = WriterConfig::default().with_identifier(*b"MONS");
    let bytes = write_flatbuffer_with(&orc(), config)?;

    assert_eq!(common::identifier(&bytes), Some(&b"MONS"[..]));
    assert_eq!(common::root(&bytes)?.string(Monster::VT_NAME)?, Some("Orc"));
    Ok(())
}

#[test]
fn small_initial_capacity_grows() -> Result<()> {
    let config = WriterConfig {
        initial_capacity: 0,
        ..WriterConfig::strict()
    };

    let mut monster = orc();
    monster.loot = (0..1000).collect();
    let bytes = write_flatbuffer_with(&monster, config)?;

    let decoded = common::root(&bytes)?;
    let loot = decoded.vector(Monster::VT_LOOT)?.expect("loot");
    assert_eq!(loot.len(), 1000);
    assert_eq!(loot.scalar::<u32>(999)?, 999);
    assert_eq!(
        decoded.table(Monster::VT_INVENTORY)?.expect("inventory").vector(4)?.expect("items").len(),
        3
    );
    Ok(())
}

#[test]
fn reused_buffer_produces_identical_bytes() -> Result<()> {
    let mut buffer = InwardBuffer::with_capacity(64);

    let first = FlatWriter::serialize_object(&orc(), &mut buffer, WriterConfig::strict())?.to_vec();
    buffer.clear();
    let second = FlatWriter::serialize_object(&orc(), &mut buffer, WriterConfig::strict())?.to_vec();

    assert_eq!(first, second);
    assert_eq!(first, write_flatbuffer(&orc())?);
    Ok(())
}

/// `struct Mat4 { m: [float; 16]; }`, column major
struct Mat4([f32; 16]);

impl Struct for Mat4 {
    const SIZE: usize = 64;
    const ALIGN: usize = 4;

    fn write_fields(&self, writer: &mut StructWriter<'_>) -> Result<()> {
        writer.array(&self.0)
    }
}

struct Node {
    name: &'static str,
    transform: Mat4,
}

impl Serialize for Node {
    fn serialize(&self, writer: &mut FlatWriter<'_>) -> Result<()> {
        writer.string(4, self.name)?;
        writer.struct_field(6, &self.transform)
    }
}

#[test]
fn matrix_struct_field() -> Result<()> {
    let mut matrix = [0.0f32; 16];
    for (index, value) in matrix.iter_mut().enumerate() {
        *value = index as f32 * 0.5;
    }
    let node = Node {
        name: "pivot",
        transform: Mat4(matrix),
    };

    let bytes = write_flatbuffer(&node)?;
    let table = common::root(&bytes)?;
    assert_eq!(table.string(4)?, Some("pivot"));

    let raw = table.bytes(6, Mat4::SIZE)?.expect("transform");
    let decoded: Vec<f32> = raw
        .chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().expect("4 bytes")))
        .collect();
    assert_eq!(decoded, matrix);
    Ok(())
}
