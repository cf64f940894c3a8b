// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! Layout analyzer.
//!
//! Finds the package-level flag registries (`flag.FlagSet` values) of a
//! target module and computes where their registration table lives, using
//! the gc compiler's size and alignment rules for the target architecture.
//! Only that table is cleared between samples: the other fields hold
//! caller configuration such as the output writer and usage callback.

use crate::error::SetupError;
use crate::gotype::{Field, Type};
use crate::module::{TargetModule, TypeName};
use crate::types::{GoArch, ModulePath};

/// Import path of the flag registry type.
pub const FLAG_REGISTRY_PACKAGE: &str = "flag";
/// Name of the flag registry type.
pub const FLAG_REGISTRY_TYPE: &str = "FlagSet";
/// Field holding the already-registered flag definitions.
pub const REGISTRATION_FIELD: &str = "formal";

/// Where one variable's registration table sits, in target-platform bytes.
///
/// Invariant: `offset + zero_size <= total_size`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayoutDescriptor {
    pub module: ModulePath,
    pub variable: String,
    pub total_size: u64,
    pub offset: u64,
    pub zero_size: u64,
}

impl LayoutDescriptor {
    /// End of the region to zero.
    pub fn end(&self) -> u64 {
        self.offset + self.zero_size
    }
}

/// Size and alignment rules of the gc compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sizes {
    word_size: u64,
    max_align: u64,
}

impl Sizes {
    pub fn for_arch(arch: GoArch) -> Self {
        Self {
            word_size: arch.word_size(),
            max_align: arch.max_align(),
        }
    }

    pub fn word_size(&self) -> u64 {
        self.word_size
    }

    pub fn align_of(&self, ty: &Type) -> u64 {
        match ty {
            Type::Array { elem, .. } => self.align_of(elem),
            Type::Struct(fields) => fields
                .iter()
                .map(|f| self.align_of(&f.ty))
                .max()
                .unwrap_or(1)
                .max(1),
            Type::Slice | Type::Interface | Type::String => self.word_size,
            Type::Basic(kind) => {
                let mut align = self.size_of(ty).max(1);
                if kind.is_complex() {
                    align /= 2;
                }
                align.min(self.max_align)
            }
            Type::Pointer => self.word_size.min(self.max_align),
        }
    }

    pub fn size_of(&self, ty: &Type) -> u64 {
        match ty {
            Type::Basic(kind) => kind.fixed_size().unwrap_or(self.word_size),
            Type::String => self.word_size * 2,
            Type::Pointer => self.word_size,
            Type::Slice => self.word_size * 3,
            Type::Interface => self.word_size * 2,
            Type::Array { len, elem } => {
                if *len == 0 {
                    return 0;
                }
                let size = self.size_of(elem);
                align_up(size, self.align_of(elem)) * (len - 1) + size
            }
            Type::Struct(fields) => {
                let Some(last) = fields.last() else {
                    return 0;
                };
                let offsets = self.offsets_of(fields);
                let last_offset = offsets[offsets.len() - 1];
                let mut last_size = self.size_of(&last.ty);
                // A trailing zero-size field must not point past the struct.
                if last_offset > 0 && last_size == 0 {
                    last_size = 1;
                }
                align_up(last_offset + last_size, self.align_of(ty))
            }
        }
    }

    /// Field offsets in declaration order.
    pub fn offsets_of(&self, fields: &[Field]) -> Vec<u64> {
        let mut offsets = Vec::with_capacity(fields.len());
        let mut offset = 0;
        for field in fields {
            offset = align_up(offset, self.align_of(&field.ty));
            offsets.push(offset);
            offset += self.size_of(&field.ty);
        }
        offsets
    }
}

fn align_up(x: u64, align: u64) -> u64 {
    x.div_ceil(align) * align
}

/// The flag registry type name.
pub fn flag_registry_type() -> TypeName {
    TypeName::new(ModulePath::new_unchecked(FLAG_REGISTRY_PACKAGE), FLAG_REGISTRY_TYPE)
}

/// Compute a descriptor for every flag registry variable of `target`.
///
/// Fails when a registry's layout lacks the registration field: the harness
/// would otherwise zero memory it does not understand.
pub fn analyze(target: &TargetModule, sizes: &Sizes) -> Result<Vec<LayoutDescriptor>, SetupError> {
    let registry = flag_registry_type();
    let mut descriptors = Vec::new();

    for var in &target.vars {
        if var.declared.as_ref() != Some(&registry) {
            continue;
        }
        let Some(Type::Struct(fields)) = &var.layout else {
            return Err(SetupError::NotAStruct {
                module: target.path.clone(),
                variable: var.name.clone(),
                type_name: registry.to_string(),
            });
        };
        let index = fields
            .iter()
            .position(|f| f.name == REGISTRATION_FIELD)
            .ok_or_else(|| SetupError::MissingLayoutField {
                module: target.path.clone(),
                variable: var.name.clone(),
                type_name: registry.to_string(),
                field: REGISTRATION_FIELD,
            })?;

        let offsets = sizes.offsets_of(fields);
        let descriptor = LayoutDescriptor {
            module: target.path.clone(),
            variable: var.name.clone(),
            total_size: sizes.size_of(&Type::Struct(fields.clone())),
            offset: offsets[index],
            zero_size: sizes.size_of(&fields[index].ty),
        };
        debug_assert!(descriptor.end() <= descriptor.total_size);

        tracing::debug!(
            module = %descriptor.module,
            variable = %descriptor.variable,
            total_size = descriptor.total_size,
            offset = descriptor.offset,
            zero_size = descriptor.zero_size,
            "Computed registration table layout"
        );
        descriptors.push(descriptor);
    }

    Ok(descriptors)
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::gotype::BasicKind;
    use crate::module::PackageVar;

    fn flagset_fields() -> Vec<Field> {
        vec![
            Field::new("Usage", Type::Pointer),
            Field::new("name", Type::String),
            Field::new("parsed", Type::Basic(BasicKind::Bool)),
            Field::new("actual", Type::Pointer),
            Field::new("formal", Type::Pointer),
            Field::new("args", Type::Slice),
            Field::new("errorHandling", Type::Basic(BasicKind::Int)),
            Field::new("output", Type::Interface),
            Field::new("undef", Type::Pointer),
        ]
    }

    fn target_with(vars: Vec<PackageVar>) -> TargetModule {
        TargetModule {
            path: ModulePath::new("example.com/app").unwrap(),
            name: "app".to_string(),
            dir: PathBuf::from("/src/app"),
            source_files: vec![PathBuf::from("/src/app/main.go")],
            vars,
        }
    }

    fn registry_var(name: &str, fields: Vec<Field>) -> PackageVar {
        PackageVar {
            name: name.to_string(),
            declared: Some(flag_registry_type()),
            layout: Some(Type::Struct(fields)),
        }
    }

    #[test]
    fn test_three_word_registry() {
        let fields = vec![
            Field::new("usage", Type::Pointer),
            Field::new("formal", Type::Pointer),
            Field::new("output", Type::Pointer),
        ];
        let target = target_with(vec![registry_var("fs", fields)]);
        let layouts = analyze(&target, &Sizes::for_arch(GoArch::Amd64)).unwrap();
        assert_eq!(layouts.len(), 1);
        assert_eq!(layouts[0].offset, 8);
        assert_eq!(layouts[0].zero_size, 8);
        assert_eq!(layouts[0].total_size, 24);
    }

    #[test]
    fn test_flagset_amd64() {
        let target = target_with(vec![registry_var("cli", flagset_fields())]);
        let layouts = analyze(&target, &Sizes::for_arch(GoArch::Amd64)).unwrap();
        assert_eq!(layouts[0].offset, 40);
        assert_eq!(layouts[0].zero_size, 8);
        assert_eq!(layouts[0].total_size, 104);
    }

    #[test]
    fn test_flagset_386() {
        let target = target_with(vec![registry_var("cli", flagset_fields())]);
        let layouts = analyze(&target, &Sizes::for_arch(GoArch::I386)).unwrap();
        assert_eq!(layouts[0].offset, 20);
        assert_eq!(layouts[0].zero_size, 4);
        assert_eq!(layouts[0].total_size, 52);
    }

    #[test]
    fn test_descriptor_fits_on_every_arch() {
        let target = target_with(vec![registry_var("cli", flagset_fields())]);
        for arch in ["386", "amd64", "amd64p32", "arm", "arm64", "mips", "wasm"] {
            let sizes = Sizes::for_arch(arch.parse().unwrap());
            for layout in analyze(&target, &sizes).unwrap() {
                assert!(layout.end() <= layout.total_size, "{}: {:?}", arch, layout);
            }
        }
    }

    #[test]
    fn test_missing_registration_field() {
        let fields = vec![Field::new("usage", Type::Pointer)];
        let target = target_with(vec![registry_var("cli", fields)]);
        let err = analyze(&target, &Sizes::for_arch(GoArch::Amd64)).unwrap_err();
        assert!(matches!(err, SetupError::MissingLayoutField { ref variable, .. } if variable == "cli"));
    }

    #[test]
    fn test_unresolved_registry_layout() {
        let mut var = registry_var("cli", vec![]);
        var.layout = None;
        let err = analyze(&target_with(vec![var]), &Sizes::for_arch(GoArch::Amd64)).unwrap_err();
        assert!(matches!(err, SetupError::NotAStruct { .. }));
    }

    #[test]
    fn test_other_variables_ignored() {
        let other = PackageVar {
            name: "count".to_string(),
            declared: None,
            layout: None,
        };
        let pointer = PackageVar {
            name: "cmd".to_string(),
            declared: Some(TypeName::new(ModulePath::new("other").unwrap(), "FlagSet")),
            layout: None,
        };
        let target = target_with(vec![other, pointer]);
        assert!(analyze(&target, &Sizes::for_arch(GoArch::Amd64)).unwrap().is_empty());
    }

    #[test]
    fn test_basic_alignment_rules() {
        let sizes = Sizes::for_arch(GoArch::I386);
        assert_eq!(sizes.align_of(&Type::Basic(BasicKind::Int64)), 4);
        assert_eq!(sizes.align_of(&Type::Basic(BasicKind::Complex128)), 4);
        let sizes = Sizes::for_arch(GoArch::Amd64);
        assert_eq!(sizes.align_of(&Type::Basic(BasicKind::Complex64)), 4);
        assert_eq!(sizes.size_of(&Type::Basic(BasicKind::Complex128)), 16);
    }

    #[test]
    fn test_struct_padding_and_arrays() {
        let sizes = Sizes::for_arch(GoArch::Amd64);
        let inner = Type::Struct(vec![
            Field::new("a", Type::Basic(BasicKind::Uint8)),
            Field::new("b", Type::Basic(BasicKind::Int32)),
            Field::new("c", Type::Basic(BasicKind::Uint8)),
        ]);
        assert_eq!(sizes.size_of(&inner), 12);
        let array = Type::Array {
            len: 3,
            elem: Box::new(inner),
        };
        assert_eq!(sizes.size_of(&array), 36);
        assert_eq!(sizes.size_of(&Type::Struct(vec![])), 0);
    }

    #[test]
    fn test_trailing_zero_size_field_is_padded() {
        let sizes = Sizes::for_arch(GoArch::Amd64);
        let ty = Type::Struct(vec![
            Field::new("n", Type::Basic(BasicKind::Int64)),
            Field::new(
                "_",
                Type::Array {
                    len: 0,
                    elem: Box::new(Type::Basic(BasicKind::Int64)),
                },
            ),
        ]);
        assert_eq!(sizes.size_of(&ty), 16);
    }
}
