// The following example builds a small layout archive with two themes' worth of groups, then picks
// one group out of it into a new archive.

use anyhow::Context;
use edjekit_archive::{
    format::{self, DIRECTORY_KEY},
    Collection, CollectionEntry, Compression, Directory, GroupRef, KeyedArchive, Part,
    ResourceEntry, ResourceRef, Welder,
};
use edjekit_core::binary::serialize;
use edjekit_pick::{pick_list_groups, pick_run, PickRequest};
use tracing::{error, metadata::LevelFilter};
use tracing_subscriber::{prelude::*, EnvFilter};

fn fallible_main() -> anyhow::Result<()> {
    let mut button = Collection::new("button");
    button.images = vec![ResourceRef::new(0), ResourceRef::new(1)];
    button.groups = vec![GroupRef::inherit("base")];
    button.parts = vec![Part {
        name: "background".into(),
        image: Some(0),
        tweens: vec![0, 1],
        ..Default::default()
    }];

    let mut base = Collection::new("base");
    base.fonts = vec![ResourceRef {
        id: 0,
        alias: Some("Sans".into()),
    }];
    base.parts = vec![Part {
        name: "label".into(),
        font: Some(0),
        ..Default::default()
    }];

    let mut slider = Collection::new("slider");
    slider.images = vec![ResourceRef::new(2)];

    let collections = [button, base, slider];
    let directory = Directory {
        collections: collections
            .iter()
            .enumerate()
            .map(|(id, collection)| CollectionEntry {
                id: id as u32,
                name: collection.name.clone(),
            })
            .collect(),
        images: vec![
            ResourceEntry {
                id: 0,
                name: "button-idle.png".into(),
            },
            ResourceEntry {
                id: 1,
                name: "button-pressed.png".into(),
            },
            ResourceEntry {
                id: 2,
                name: "slider.png".into(),
            },
        ],
        fonts: vec![ResourceEntry {
            id: 0,
            name: "Sans.ttf".into(),
        }],
        ..Default::default()
    };

    let mut welder = Welder::new();
    welder.write_key(DIRECTORY_KEY, &serialize(&directory)?, Compression::Zlib)?;
    for (id, collection) in collections.iter().enumerate() {
        welder.write_key(
            &format::collection_key(id as u32),
            &serialize(collection)?,
            Compression::Zlib,
        )?;
    }
    welder.write_key("edje/images/0", b"idle pixels", Compression::None)?;
    welder.write_key("edje/images/1", b"pressed pixels", Compression::None)?;
    welder.write_key("edje/images/2", b"slider pixels", Compression::None)?;
    welder.write_key("edje/fonts/0", b"glyphs", Compression::None)?;
    let archive = welder.weld().context("cannot weld archive")?;

    std::fs::write("Example.edj", archive)?;
    println!("Example.edj: {:?}", pick_list_groups("Example.edj")?);

    // Pick the button; its base and the images and font they use come along with it.
    let report = pick_run(&PickRequest::new("Picked.edj").include_group("Example.edj", "button"))?;
    println!("{report:#?}");

    let mut picked = KeyedArchive::open("Picked.edj")?;
    println!("{:#?}", picked.summary());
    println!("{:#?}", picked.read_record::<Directory>(DIRECTORY_KEY)?);

    Ok(())
}

fn main() {
    let subscriber = tracing_subscriber::registry()
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::DEBUG.into())
                .from_env_lossy(),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_writer(std::io::stderr),
        );
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("cannot set default tracing subscriber: {err}");
    }

    match fallible_main() {
        Ok(_) => (),
        Err(err) => {
            error!("in fallible_main: {err:?}");
        }
    }
}
