use std::{
    collections::HashSet,
    io::{Read, Write},
};

use edjekit_core::{
    binary::{self, Deserializer, ErrorKind, Serializer},
    string::ArchiveString,
    Deserialize, Serialize,
};

use crate::key::ResourceKind;

/// A named layout collection ("group"), stored under [`format::collection_key`][crate::format::collection_key].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Collection {
    pub name: ArchiveString,
    pub images: Vec<ResourceRef>,
    pub samples: Vec<ResourceRef>,
    pub fonts: Vec<ResourceRef>,
    pub groups: Vec<GroupRef>,
    pub parts: Vec<Part>,
}

/// Reference from a collection to a resource of the same archive.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResourceRef {
    pub id: u32,
    /// Name the collection uses for the resource, if it differs from the resource's own.
    pub alias: Option<ArchiveString>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupRefKind {
    Inherit,
    Embed,
}

/// Reference from a collection to another collection of the same archive, by name.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GroupRef {
    pub kind: GroupRefKind,
    pub name: ArchiveString,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Part {
    pub name: ArchiveString,
    pub kind: u8,
    pub image: Option<u32>,
    /// Images of the part's image animation.
    pub tweens: Vec<u32>,
    pub sample: Option<u32>,
    pub font: Option<u32>,
    /// Collection embedded into this part.
    pub source: Option<ArchiveString>,
    /// Layout description; copied verbatim.
    pub payload: Vec<u8>,
}

impl ResourceRef {
    pub fn new(id: u32) -> Self {
        Self { id, alias: None }
    }
}

impl GroupRef {
    pub fn inherit(name: &str) -> Self {
        Self {
            kind: GroupRefKind::Inherit,
            name: name.into(),
        }
    }

    pub fn embed(name: &str) -> Self {
        Self {
            kind: GroupRefKind::Embed,
            name: name.into(),
        }
    }
}

impl Collection {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn resource_refs(&self, kind: ResourceKind) -> &[ResourceRef] {
        match kind {
            ResourceKind::Image => &self.images,
            ResourceKind::Sample => &self.samples,
            ResourceKind::Font => &self.fonts,
        }
    }

    fn resource_refs_mut(&mut self, kind: ResourceKind) -> &mut Vec<ResourceRef> {
        match kind {
            ResourceKind::Image => &mut self.images,
            ResourceKind::Sample => &mut self.samples,
            ResourceKind::Font => &mut self.fonts,
        }
    }

    /// Names of the collections this one depends on: its group references first, then
    /// collections embedded by parts that aren't also group references. Each name is yielded
    /// once, in order of first appearance.
    pub fn dependencies(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.groups
            .iter()
            .map(|group| group.name.as_str())
            .chain(self.parts.iter().filter_map(|part| part.source.as_deref()))
            .filter(|name| seen.insert(*name))
            .collect()
    }

    /// Rewrites every resource id in the collection, both in the reference tables and inside
    /// parts, through `map`.
    pub fn remap_resources<E>(
        &mut self,
        mut map: impl FnMut(ResourceKind, u32) -> Result<u32, E>,
    ) -> Result<(), E> {
        for kind in ResourceKind::ALL {
            for reference in self.resource_refs_mut(kind) {
                reference.id = map(kind, reference.id)?;
            }
        }
        for part in &mut self.parts {
            if let Some(image) = &mut part.image {
                *image = map(ResourceKind::Image, *image)?;
            }
            for tween in &mut part.tweens {
                *tween = map(ResourceKind::Image, *tween)?;
            }
            if let Some(sample) = &mut part.sample {
                *sample = map(ResourceKind::Sample, *sample)?;
            }
            if let Some(font) = &mut part.font {
                *font = map(ResourceKind::Font, *font)?;
            }
        }
        Ok(())
    }
}

impl GroupRefKind {
    const INHERIT: u8 = 0;
    const EMBED: u8 = 1;
}

impl binary::Deserialize for GroupRefKind {
    fn deserialize(deserializer: &mut Deserializer<impl Read>) -> Result<Self, binary::Error> {
        match deserializer.deserialize::<u8>()? {
            Self::INHERIT => Ok(Self::Inherit),
            Self::EMBED => Ok(Self::Embed),
            other => Err(ErrorKind::Deserialize.make(format!("invalid group reference kind {other}"))),
        }
    }
}

impl binary::Serialize for GroupRefKind {
    fn serialize(&self, serializer: &mut Serializer<impl Write>) -> Result<(), binary::Error> {
        let kind = match self {
            Self::Inherit => Self::INHERIT,
            Self::Embed => Self::EMBED,
        };
        binary::Serialize::serialize(&kind, serializer)
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;

    use edjekit_core::binary::{deserialize, serialize};
    use pretty_assertions::assert_eq;

    use crate::key::ResourceKind;

    use super::{Collection, GroupRef, Part, ResourceRef};

    fn button() -> Collection {
        Collection {
            images: vec![ResourceRef::new(3), ResourceRef::new(5)],
            fonts: vec![ResourceRef {
                id: 1,
                alias: Some("Sans".into()),
            }],
            groups: vec![GroupRef::inherit("base"), GroupRef::embed("icon")],
            parts: vec![
                Part {
                    name: "bg".into(),
                    image: Some(3),
                    tweens: vec![5, 3],
                    ..Default::default()
                },
                Part {
                    name: "label".into(),
                    font: Some(1),
                    source: Some("icon".into()),
                    payload: vec![1, 2, 3],
                    ..Default::default()
                },
                Part {
                    name: "swallow".into(),
                    source: Some("extra".into()),
                    ..Default::default()
                },
            ],
            ..Collection::new("button")
        }
    }

    #[test]
    fn collection_survives_serialization() {
        let collection = button();
        let bytes = serialize(&collection).unwrap();
        assert_eq!(deserialize::<Collection>(&bytes).unwrap(), collection);
    }

    #[test]
    fn dependencies_are_unique_and_ordered() {
        assert_eq!(button().dependencies(), vec!["base", "icon", "extra"]);
    }

    #[test]
    fn remapping_touches_tables_and_parts() {
        let mut collection = button();
        collection
            .remap_resources(|kind, id| {
                Ok::<_, Infallible>(match kind {
                    ResourceKind::Image => id * 10,
                    _ => id + 100,
                })
            })
            .unwrap();
        assert_eq!(
            collection.images.iter().map(|r| r.id).collect::<Vec<_>>(),
            vec![30, 50]
        );
        assert_eq!(collection.fonts[0].id, 101);
        assert_eq!(collection.parts[0].image, Some(30));
        assert_eq!(collection.parts[0].tweens, vec![50, 30]);
        assert_eq!(collection.parts[1].font, Some(101));
        assert_eq!(collection.parts[1].payload, vec![1, 2, 3]);
    }

    #[test]
    fn invalid_group_reference_kind_is_rejected() {
        // One group reference of kind 7 named "x".
        let mut bytes = serialize(&Collection::new("a")).unwrap();
        let groups_at = bytes.len() - 8;
        bytes.splice(groups_at..groups_at + 4, [1, 0, 0, 0, 7, 1, 0, 0, 0, b'x']);
        assert!(deserialize::<Collection>(&bytes).is_err());
    }
}
