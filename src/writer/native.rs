//! [`NativeStruct`] layouts for common fixed-size value types.
//!
//! Schemas frequently declare small math and identifier structs (`Vec2`, `Vec3`, `Vec4`/`Quat`,
//! `Mat4`, `Guid`) that applications already model with their own types. These implementations
//! write such values with exactly the byte layout the schema struct declares:
//!
//! | Type            | Schema layout                      | Size | Align |
//! |-----------------|------------------------------------|------|-------|
//! | `[f32; 2]`      | `struct Vec2 { x, y: float }`      | 8    | 4     |
//! | `[f32; 3]`      | `struct Vec3 { x, y, z: float }`   | 12   | 4     |
//! | `[f32; 4]`      | `struct Vec4 / Quat`               | 16   | 4     |
//! | `[f32; 16]`     | `struct Mat4 { c0..c3: Vec4 }`     | 64   | 4     |
//! | `uguid::Guid`   | `struct Guid { u32, u16, u16, [ubyte:8] }` | 16 | 4 |

use crate::{
    buffer::io::write_le_at, writer::traits::NativeStruct, Error::OutOfBounds, Result,
};

macro_rules! impl_float_array {
    ($($len:expr),* $(,)?) => {
        $(
            impl NativeStruct for [f32; $len] {
                const SIZE: usize = $len * 4;
                const ALIGN: usize = 4;

                fn write_native(&self, out: &mut [u8]) -> Result<()> {
                    let mut offset = 0;
                    for component in self {
                        write_le_at(out, &mut offset, *component)?;
                    }
                    Ok(())
                }
            }
        )*
    };
}

impl_float_array!(2, 3, 4, 16);

impl NativeStruct for uguid::Guid {
    const SIZE: usize = 16;
    const ALIGN: usize = 4;

    fn write_native(&self, out: &mut [u8]) -> Result<()> {
        let Some(region) = out.get_mut(..Self::SIZE) else {
            return Err(OutOfBounds);
        };

        // Mixed-endian layout: first three groups little-endian, tail bytes verbatim
        region.copy_from_slice(&self.to_bytes());
        Ok(())
    }
}
