//! Demonstration/test harness binary (§5 of the design): exercises the
//! library end-to-end through GSM encode/decode, conformance-vector
//! checking, and SCAMP/RTTY WAV demodulation.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::{debug, info, warn};

use radlib::config::Config;
use radlib::fsk::Demodulator;
use radlib::gsm;
use radlib::listener::DemodulatorListener;
use radlib::rtty::BaudotDecoder;
use radlib::scamp::ScampDecoder;
use radlib::wav;

#[derive(Parser)]
#[command(name = "radlib-cli", about = "GSM 06.10 / SCAMP / RTTY demo harness")]
struct Cli {
    /// Optional JSON configuration file overriding the defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// GSM 06.10 speech codec operations.
    Gsm {
        #[command(subcommand)]
        action: GsmAction,
    },
    /// Demodulate a SCAMP capture.
    Scamp {
        /// Mono 16-bit PCM WAV file to demodulate.
        input: PathBuf,
    },
    /// Demodulate an RTTY (Baudot) capture.
    Rtty {
        /// Mono 16-bit PCM WAV file to demodulate.
        input: PathBuf,
    },
}

#[derive(Subcommand)]
enum GsmAction {
    /// Encode a WAV file to a stream of packed 260-bit GSM frames.
    Encode { input: PathBuf, output: PathBuf },
    /// Decode a stream of packed GSM frames back to a WAV file.
    Decode { input: PathBuf, output: PathBuf },
    /// Run the bit-exact conformance vectors, if present.
    Conformance { vectors_dir: PathBuf },
}

fn load_config(path: Option<&Path>) -> Config {
    match path {
        None => Config::default(),
        Some(p) => match fs::read_to_string(p).and_then(|s| {
            serde_json::from_str(&s).map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
        }) {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!("failed to load config {}: {e}, using defaults", p.display());
                Config::default()
            }
        },
    }
}

fn gsm_encode(input: &Path, output: &Path) -> radlib::error::RadlibResult<()> {
    let (_rate, samples) = wav::read_mono_pcm16(input)?;
    let mut encoder = gsm::Encoder::new();
    let mut out = Vec::new();

    for chunk in samples.chunks(160) {
        if chunk.len() < 160 {
            break;
        }
        let mut frame = [0i16; 160];
        frame.copy_from_slice(chunk);
        let params = encoder.encode(&frame);
        let mut area = [0u8; gsm::FRAME_OCTETS];
        params.pack(&mut area);
        out.extend_from_slice(&area);
    }

    fs::write(output, &out)?;
    info!("encoded {} GSM frames to {}", out.len() / gsm::FRAME_OCTETS, output.display());
    Ok(())
}

fn gsm_decode(input: &Path, output: &Path) -> radlib::error::RadlibResult<()> {
    let data = fs::read(input)?;
    let mut decoder = gsm::Decoder::new();
    let mut pcm = Vec::new();

    for area in data.chunks(gsm::FRAME_OCTETS) {
        if area.len() < gsm::FRAME_OCTETS {
            break;
        }
        let mut fixed_area = [0u8; gsm::FRAME_OCTETS];
        fixed_area.copy_from_slice(area);
        let params = gsm::Parameters::unpack(&fixed_area);
        pcm.extend_from_slice(&decoder.decode(&params));
    }

    wav::write_mono_pcm16(output, 8000, &pcm)?;
    info!("decoded {} samples to {}", pcm.len(), output.display());
    Ok(())
}

const VECTOR_FRAME_SAMPLES: usize = 160;
const VECTOR_FRAME_BYTES: usize = VECTOR_FRAME_SAMPLES * 2;

/// Reads a conformance vector file as little-endian 16-bit PCM frames of
/// `VECTOR_FRAME_SAMPLES` samples each, dropping any trailing partial frame.
fn read_pcm_frames(path: &Path) -> std::io::Result<Vec<[i16; VECTOR_FRAME_SAMPLES]>> {
    let bytes = fs::read(path)?;
    let mut frames = Vec::new();
    for chunk in bytes.chunks(VECTOR_FRAME_BYTES) {
        if chunk.len() < VECTOR_FRAME_BYTES {
            break;
        }
        let mut frame = [0i16; VECTOR_FRAME_SAMPLES];
        for (s, pair) in frame.iter_mut().zip(chunk.chunks(2)) {
            *s = i16::from_le_bytes([pair[0], pair[1]]);
        }
        frames.push(frame);
    }
    Ok(frames)
}

const WORDS_PER_FRAME: usize = 76;
const COD_FRAME_BYTES: usize = WORDS_PER_FRAME * 2;

/// Reads a `.cod` vector: 76 little-endian 16-bit words per frame,
/// uncompressed (the ETSI reference form, distinct from this crate's own
/// packed 260-bit wire layout).
fn read_cod_frames(path: &Path) -> std::io::Result<Vec<[i16; WORDS_PER_FRAME]>> {
    let bytes = fs::read(path)?;
    let mut frames = Vec::new();
    for chunk in bytes.chunks(COD_FRAME_BYTES) {
        if chunk.len() < COD_FRAME_BYTES {
            break;
        }
        let mut words = [0i16; WORDS_PER_FRAME];
        for (w, pair) in words.iter_mut().zip(chunk.chunks(2)) {
            *w = i16::from_le_bytes([pair[0], pair[1]]);
        }
        frames.push(words);
    }
    Ok(frames)
}

/// Runs one Seq0N vector: encodes `<name>.inp` and compares the 76-word
/// parameter set against `<name>.cod`, then decodes those same parameters
/// and compares the resulting PCM against `<name>.out`. Returns the number
/// of mismatched frames found (0 means a clean pass).
fn check_vector(vectors_dir: &Path, name: &str) -> radlib::error::RadlibResult<u32> {
    let inp_path = vectors_dir.join(format!("{name}.inp"));
    let cod_path = vectors_dir.join(format!("{name}.cod"));
    let out_path = vectors_dir.join(format!("{name}.out"));

    let inp_frames = read_pcm_frames(&inp_path)?;
    let cod_frames = read_cod_frames(&cod_path)?;
    let out_frames = if out_path.exists() { Some(read_pcm_frames(&out_path)?) } else { None };

    let mut encoder = gsm::Encoder::new();
    let mut decoder = gsm::Decoder::new();
    let mut mismatches = 0u32;

    for (i, pcm_in) in inp_frames.iter().enumerate() {
        let params = encoder.encode(pcm_in);
        let words = params.to_words();

        match cod_frames.get(i) {
            Some(expected) if expected == &words => {}
            Some(_) => {
                warn!("{name}: frame {i} parameter mismatch");
                mismatches += 1;
            }
            None => {
                warn!("{name}: {} is shorter than its .inp frame count", cod_path.display());
                mismatches += 1;
                continue;
            }
        }

        let pcm_out = decoder.decode(&params);
        if let Some(expected_out) = out_frames.as_ref().and_then(|f| f.get(i)) {
            if &pcm_out != expected_out {
                warn!("{name}: frame {i} decoded PCM mismatch");
                mismatches += 1;
            }
        }
    }

    Ok(mismatches)
}

fn gsm_conformance(vectors_dir: &Path) -> i32 {
    if !vectors_dir.is_dir() {
        warn!(
            "conformance vectors not found at {} (ETSI test vectors are not redistributed with this repository)",
            vectors_dir.display()
        );
        return 1;
    }

    let mut checked = 0;
    let mut total_mismatches = 0u32;
    for name in ["Seq01", "Seq02", "Seq03", "Seq04", "Seq05"] {
        let inp_path = vectors_dir.join(format!("{name}.inp"));
        if !inp_path.exists() {
            debug!("{name}: no .inp vector present, skipping");
            continue;
        }

        checked += 1;
        match check_vector(vectors_dir, name) {
            Ok(0) => info!("{name}: bit-exact"),
            Ok(n) => {
                warn!("{name}: {n} mismatched frame(s)");
                total_mismatches += n;
            }
            Err(e) => {
                warn!("{name}: failed to run ({e})");
                total_mismatches += 1;
            }
        }
    }

    if checked == 0 {
        warn!("no Seq01..Seq05 vectors found under {}", vectors_dir.display());
        return 1;
    }

    if total_mismatches > 0 {
        warn!("conformance check failed: {total_mismatches} mismatch(es) across {checked} vector(s)");
        return 1;
    }

    info!("all {checked} conformance vector(s) passed bit-exact");
    0
}

struct LoggingListener {
    received: String,
}

impl DemodulatorListener for LoggingListener {
    fn data_sync_acquired(&mut self) {
        debug!("data sync acquired");
    }
    fn data_sync_lost(&mut self) {
        debug!("data sync lost");
    }
    fn frequency_locked(&mut self, mark_freq_hz: f32, space_freq_hz: f32) {
        debug!("frequency locked: mark={mark_freq_hz:.1}Hz space={space_freq_hz:.1}Hz");
    }
    fn bad_frame_received(&mut self, raw_frame: u32) {
        debug!("bad frame: {raw_frame:#010x}");
    }
    fn discarded_duplicate(&mut self) {
        debug!("discarded duplicate codeword");
    }
    fn received(&mut self, ascii_char: char) {
        self.received.push(ascii_char);
    }
}

fn scamp_demod(input: &Path, cfg: &Config) -> radlib::error::RadlibResult<()> {
    let (rate, samples) = wav::read_mono_pcm16(input)?;
    let mut decoder = ScampDecoder::new(rate as u16);
    let mut listener = LoggingListener { received: String::new() };
    let _ = cfg;

    for &s in &samples {
        decoder.process_sample(s, &mut listener);
    }

    println!("{}", listener.received);
    Ok(())
}

fn rtty_demod(input: &Path, cfg: &Config) -> radlib::error::RadlibResult<()> {
    let (rate, samples) = wav::read_mono_pcm16(input)?;
    let mut demod = Demodulator::new(rate as u16, 300, 9, 512);
    demod.set_symbol_spread(cfg.rtty_shift_hz);
    let mut baudot = BaudotDecoder::new(rate as u16, cfg.rtty_baud_times100, 3);
    let mut listener = LoggingListener { received: String::new() };

    for &s in &samples {
        if let Some(symbol) = demod.process_sample(s, &mut listener) {
            baudot.process_symbol(symbol, &mut listener);
        }
    }

    println!("{}", listener.received);
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();
    let cfg = load_config(cli.config.as_deref());

    let exit_code = match cli.command {
        Command::Gsm { action } => match action {
            GsmAction::Encode { input, output } => match gsm_encode(&input, &output) {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("error: {e}");
                    1
                }
            },
            GsmAction::Decode { input, output } => match gsm_decode(&input, &output) {
                Ok(()) => 0,
                Err(e) => {
                    eprintln!("error: {e}");
                    1
                }
            },
            GsmAction::Conformance { vectors_dir } => gsm_conformance(&vectors_dir),
        },
        Command::Scamp { input } => match scamp_demod(&input, &cfg) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("error: {e}");
                1
            }
        },
        Command::Rtty { input } => match rtty_demod(&input, &cfg) {
            Ok(()) => 0,
            Err(e) => {
                eprintln!("error: {e}");
                1
            }
        },
    };

    std::process::exit(exit_code);
}
