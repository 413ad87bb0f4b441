//! Command-line host for animatlas documents.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use animatlas::config::{EditorConfig, LogLevel};
use animatlas::format::AnimationEntry;
use animatlas::host::{FileFilter, FileIo, Host};
use animatlas::model::{Entity, EntityId, ImageState, SpriteKey, TrackData};
use animatlas::{Document, EditorError, EditorSession, Result};

#[derive(Parser, Debug)]
#[command(name = "animatlas", version, about = "Edit sprite atlas animation documents")]
struct Cli {
    /// Log verbosity (error, warn, info, debug, trace). Overrides the config file.
    #[arg(long, global = true)]
    log_level: Option<LogLevel>,

    /// Config file to use instead of the default location.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create an empty document.
    New {
        doc: PathBuf,
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
    /// Summarise a document.
    Info { doc: PathBuf },
    /// Load and re-save a document in canonical form.
    Fmt {
        doc: PathBuf,
        /// Write here instead of in place.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace an atlas's sprites with a uniform grid.
    Slice {
        doc: PathBuf,
        #[arg(long)]
        atlas: String,
        #[arg(long)]
        rows: u32,
        #[arg(long)]
        cols: u32,
    },
    /// Import a TexturePacker JSON manifest as a new atlas.
    Import { doc: PathBuf, manifest: PathBuf },
    /// Add an image as a new atlas with no sprites.
    AddAtlas { doc: PathBuf, image: PathBuf },
    /// Remove an atlas.
    RemoveAtlas {
        doc: PathBuf,
        atlas: String,
        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
    /// Add an empty animation.
    AddAnimation {
        doc: PathBuf,
        id: String,
        #[arg(long, default_value_t = 0)]
        duration: i64,
    },
    /// Key a sprite into an animation.
    Key {
        doc: PathBuf,
        #[arg(long)]
        animation: String,
        #[arg(long)]
        atlas: String,
        #[arg(long)]
        sprite: String,
        #[arg(long, allow_negative_numbers = true)]
        frame: i64,
        /// Position override as X,Y.
        #[arg(long, value_delimiter = ',', num_args = 2, allow_negative_numbers = true)]
        pos: Option<Vec<i64>>,
    },
    /// Open a document and add an atlas using native file dialogs.
    #[cfg(feature = "dialogs")]
    Pick,
}

/// Host for non-interactive use: files on disk, no pickers, y/n on stdin.
struct CliHost {
    assume_yes: bool,
}

impl FileIo for CliHost {}

impl Host for CliHost {
    fn request_open_path(&self, filter: FileFilter) -> Option<PathBuf> {
        log::debug!("No file picker for {}", filter.name());
        None
    }

    fn request_save_path(&self, default_name: &str) -> Option<PathBuf> {
        log::debug!("No save dialog (suggested {})", default_name);
        None
    }

    fn request_confirmation(&self, title: &str, message: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        eprint!("{title}: {message} [y/N] ");
        let _ = std::io::stderr().flush();
        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes")
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(EditorConfig::default_path);
    let mut config = config_path
        .as_deref()
        .map(EditorConfig::load_from)
        .unwrap_or_default();

    let level = cli.log_level.unwrap_or(config.preferences.log_level);
    env_logger::Builder::new()
        .filter_level(level.to_level_filter())
        .parse_default_env()
        .init();

    match run(cli.cmd, &config) {
        Ok(Some(doc)) => {
            config.push_recent(&doc);
            if let Some(path) = &config_path {
                if let Err(e) = config.save_to(path) {
                    log::warn!("Could not save config: {}", e);
                }
            }
            ExitCode::SUCCESS
        }
        Ok(None) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

/// Run one command. Returns the document path to remember, if any.
fn run(cmd: Command, config: &EditorConfig) -> Result<Option<PathBuf>> {
    let host = CliHost { assume_yes: false };
    let mut session = EditorSession::new();
    session.set_default_document_name(config.preferences.default_document_name.clone());

    match cmd {
        Command::New { doc, force } => {
            if doc.exists() && !force {
                return Err(EditorError::invalid_argument(format!(
                    "{} already exists (use --force to overwrite)",
                    doc.display()
                )));
            }
            session.save_document_to(&host, &doc)?;
            println!("Created {}", doc.display());
            Ok(Some(doc))
        }
        Command::Info { doc } => {
            session.open_document_at(&host, &doc)?;
            print_info(session.document());
            Ok(Some(doc))
        }
        Command::Fmt { doc, output } => {
            session.open_document_at(&host, &doc)?;
            let target = output.unwrap_or_else(|| doc.clone());
            session.save_document_to(&host, &target)?;
            Ok(Some(target))
        }
        Command::Slice {
            doc,
            atlas,
            rows,
            cols,
        } => {
            session.open_document_at(&host, &doc)?;
            let id = atlas_entity(session.document(), &atlas)?;
            session.grid_slice(id, rows, cols)?;
            session.save_document(&host)?;
            let count = session
                .document()
                .atlases()
                .find(id)
                .map_or(0, |a| a.sprites().len());
            println!("Sliced '{atlas}' into {count} sprites");
            Ok(Some(doc))
        }
        Command::Import { doc, manifest } => {
            session.open_document_at(&host, &doc)?;
            let id = session.import_manifest_at(&host, &manifest)?;
            report_new_atlas(session.document(), id);
            session.save_document(&host)?;
            Ok(Some(doc))
        }
        Command::AddAtlas { doc, image } => {
            session.open_document_at(&host, &doc)?;
            let id = session.new_atlas_from_image(&host, &image)?;
            report_new_atlas(session.document(), id);
            session.save_document(&host)?;
            Ok(Some(doc))
        }
        Command::RemoveAtlas { doc, atlas, yes } => {
            let host = CliHost { assume_yes: yes };
            session.open_document_at(&host, &doc)?;
            let id = atlas_entity(session.document(), &atlas)?;
            if session.delete_atlas(&host, id)? {
                session.save_document(&host)?;
                println!("Removed '{atlas}'");
            } else {
                println!("Cancelled");
            }
            Ok(Some(doc))
        }
        Command::AddAnimation { doc, id, duration } => {
            session.open_document_at(&host, &doc)?;
            session
                .document_mut()
                .animations_mut()
                .push(AnimationEntry::new(id, duration));
            session.save_document(&host)?;
            Ok(Some(doc))
        }
        Command::Key {
            doc,
            animation,
            atlas,
            sprite,
            frame,
            pos,
        } => {
            session.open_document_at(&host, &doc)?;
            let mut key = SpriteKey::new(sprite);
            if let Some([x, y]) = pos.as_deref().and_then(|p| <[i64; 2]>::try_from(p).ok()) {
                key = key.at(x, y);
            }
            insert_key(session.document_mut(), &animation, &atlas, frame, key)?;
            session.save_document(&host)?;
            Ok(Some(doc))
        }
        #[cfg(feature = "dialogs")]
        Command::Pick => pick(&mut session),
    }
}

fn atlas_entity(doc: &Document, id: &str) -> Result<EntityId> {
    doc.atlas_by_id(id)
        .map(|a| a.entity_id())
        .ok_or_else(|| EditorError::not_found("atlas", id))
}

fn insert_key(
    doc: &mut Document,
    animation: &str,
    atlas: &str,
    frame: i64,
    key: SpriteKey,
) -> Result<()> {
    if doc.atlas_by_id(atlas).is_none() {
        log::warn!("Atlas '{}' does not exist; keying anyway", atlas);
    }
    let anim = doc
        .animation_by_id_mut(animation)
        .ok_or_else(|| EditorError::not_found("animation", animation))?;
    if anim.sprite_track_for(atlas).is_none() {
        anim.add_sprite_track(atlas);
    }
    let track = anim
        .sprite_track_for(atlas)
        .ok_or_else(|| EditorError::not_found("sprite track", atlas))?;
    let outcome = track.insert_sprite_key(frame, key)?;
    if outcome.is_insert() {
        println!("Keyed frame {frame}");
    } else {
        println!("Replaced key at frame {frame}");
    }
    Ok(())
}

fn report_new_atlas(doc: &Document, id: EntityId) {
    if let Some(atlas) = doc.atlases().find(id) {
        println!(
            "Added atlas '{}' ({}, {} sprites)",
            atlas.id(),
            atlas.path(),
            atlas.sprites().len()
        );
    }
}

fn print_info(doc: &Document) {
    println!("Atlases: {}", doc.atlases().len());
    for atlas in doc.atlases() {
        let image = match atlas.image() {
            ImageState::Loaded(p) => format!("{}x{}", p.width(), p.height()),
            ImageState::Failed(e) => format!("unavailable: {e}"),
            ImageState::NotLoaded => "not loaded".to_string(),
        };
        println!(
            "  {} [{}] {} sprites, image {}",
            atlas.id(),
            atlas.path(),
            atlas.sprites().len(),
            image
        );
    }

    println!("Animations: {}", doc.animations().len());
    for anim in doc.animations() {
        println!("  {} ({} frames)", anim.id(), anim.duration());
        for track in anim.tracks() {
            match track.data() {
                TrackData::Sprite(t) => {
                    println!("    sprite track '{}': {} keys", t.atlas_id(), t.keys().len())
                }
                TrackData::Rect(t) => println!(
                    "    rect track {} '{}': {} keys",
                    t.id(),
                    t.group_id(),
                    t.keys().len()
                ),
            }
        }
        if !anim.events().is_empty() || !anim.metadata().is_empty() {
            println!(
                "    {} events, {} metadata entries",
                anim.events().len(),
                anim.metadata().len()
            );
        }
    }

    println!(
        "Declarations: {} events, {} metadata properties",
        doc.event_definitions().len(),
        doc.metadata_definitions().len()
    );

    let dangling = doc.dangling_references();
    if !dangling.is_empty() {
        println!("Unresolved sprite keys: {}", dangling.len());
        for d in dangling {
            println!(
                "  {} @ {}: {}/{}",
                d.animation, d.frame, d.reference.atlas_id, d.reference.sprite_id
            );
        }
    }
}

#[cfg(feature = "dialogs")]
fn pick(session: &mut EditorSession) -> Result<Option<PathBuf>> {
    let host = animatlas::host::DialogHost;
    if session.open_document(&host)?.is_none() {
        return Ok(None);
    }
    if let Some(id) = session.new_atlas(&host)? {
        report_new_atlas(session.document(), id);
        session.save_document(&host)?;
    }
    Ok(session.path().map(|p| p.to_path_buf()))
}
