use pmodidl::{DidlDocument, DidlObject, EmitOptions, ParseMode, Resource, kinds};

fn main() -> pmodidl::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let track = DidlObject::builder(&kinds::MUSIC_TRACK)
        .id("test1")
        .parent_id("root")
        .restricted("1")
        .title("Test Song")
        .property("creator", "Test Artist")
        .property("artist", "Test Artist")
        .property("originalTrackNumber", "1")
        .resource(
            Resource::new("http://example.com/test.flac", "http-get:*:audio/flac:*")
                .with_duration("0:03:00")
                .with_audio_format("44100", "16", "2"),
        )
        .build()?;

    let album = DidlObject::builder(&kinds::MUSIC_ALBUM)
        .id("album1")
        .parent_id("0")
        .restricted("1")
        .title("Test Album")
        .child(track)
        .build()?;

    let mut didl = DidlDocument::new();
    didl.push(album);

    let options = EmitOptions {
        indent: true,
        ..EmitOptions::default()
    };
    let xml = didl.to_xml_string(&options)?;

    println!("=== Output from DidlDocument::to_xml_string() ===");
    println!("{}", xml);
    println!("\n=== Length: {} bytes ===", xml.len());
    println!(
        "\n=== Starts with '<?xml' ? {} ===",
        xml.starts_with("<?xml")
    );

    let parsed = DidlDocument::parse_str(&xml, ParseMode::Strict)?;
    println!("\n=== Round trip equal ? {} ===", parsed == didl);
    println!("\n{}", parsed.to_markdown());

    Ok(())
}
