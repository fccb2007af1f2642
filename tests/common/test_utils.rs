use rand::Rng;
use std::{fs, path::PathBuf};

/// Temporary filter file that is removed when dropped
#[allow(dead_code)]
pub struct TestFile {
    path: PathBuf,
}

impl TestFile {
    #[allow(dead_code)]
    /// Create a path unique to the test name and process
    pub fn new(test_name: &str) -> Self {
        let path = std::env::temp_dir().join(format!(
            "ntbloom_{}_{}.bf",
            test_name,
            std::process::id()
        ));
        Self { path }
    }

    #[allow(dead_code)]
    pub fn path(&self) -> PathBuf {
        self.path.clone()
    }
}

impl Drop for TestFile {
    fn drop(&mut self) {
        if self.path.exists() {
            let _ = fs::remove_file(&self.path);
        }
    }
}

/// Random ACGT sequence of length `len`
#[allow(dead_code)]
pub fn random_dna(rng: &mut impl Rng, len: usize) -> Vec<u8> {
    const BASES: &[u8; 4] = b"ACGT";
    (0..len).map(|_| BASES[rng.random_range(0..4)]).collect()
}

/// Install a tracing subscriber once; honours `RUST_LOG`
#[allow(dead_code)]
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
