//! Wallet identities.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::ids;
use crate::time::Millis;

/// Number of secret words per wallet.
pub const PHRASE_LEN: usize = 10;

/// Secret-word dictionary. `ember` appears twice; phrases are still drawn
/// without repetition.
pub const DICTIONARY: [&str; 100] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet",
    "kilo", "lima", "mike", "november", "oscar", "papa", "quebec", "romeo", "sierra", "tango",
    "uniform", "victor", "whiskey", "xray", "yankee", "zulu", "amber", "azure", "coral", "onyx",
    "pearl", "ruby", "topaz", "jet", "iris", "lotus", "maple", "nebula", "orbit", "pluto",
    "quartz", "raven", "solar", "terra", "umbra", "velvet", "willow", "xenon", "yarrow", "zenith",
    "aurora", "blossom", "comet", "dawn", "ember", "fable", "glimmer", "harbor", "island", "jade",
    "kepler", "lunar", "meadow", "nylon", "opal", "pixel", "quill", "ripple", "sable", "thunder",
    "ultra", "vortex", "wander", "xerox", "yodel", "zephyr", "atlas", "breeze", "cipher", "drift",
    "ember", "flame", "groove", "horizon", "ion", "jigsaw", "knot", "legend", "magma", "nimbus",
    "omega", "pulse", "quiver", "rift", "silk", "trail", "unity", "vault", "whisper", "yonder",
];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WalletSkin {
    #[default]
    Classic,
    Sunset,
    Ocean,
    Midnight,
    Glass,
}

impl WalletSkin {
    pub const ALL: [WalletSkin; 5] = [
        WalletSkin::Classic,
        WalletSkin::Sunset,
        WalletSkin::Ocean,
        WalletSkin::Midnight,
        WalletSkin::Glass,
    ];
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: String,
    /// `dddd dddd dddd dddd`.
    pub card_number: String,
    #[serde(default)]
    pub skin: WalletSkin,
    pub created_at: Millis,
    pub words: Vec<String>,
    /// Account the wallet belongs to.
    pub owner: String,
}

impl Wallet {
    pub fn generate<R: Rng + ?Sized>(owner: &str, now: Millis, rng: &mut R) -> Self {
        Self {
            id: ids::wallet_id(rng),
            card_number: ids::card_number(rng),
            skin: WalletSkin::Classic,
            created_at: now,
            words: ids::pick_unique(rng, &DICTIONARY, PHRASE_LEN)
                .into_iter()
                .map(str::to_string)
                .collect(),
            owner: owner.to_string(),
        }
    }

    /// Whether `phrase` is exactly this wallet's words, in any order.
    /// Matching ignores case and surrounding whitespace.
    pub fn matches_phrase<W: AsRef<str>>(&self, phrase: &[W]) -> bool {
        let mut given: Vec<String> = phrase
            .iter()
            .map(|w| w.as_ref().trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
        let mut own: Vec<String> = self.words.iter().map(|w| w.to_lowercase()).collect();
        given.sort();
        own.sort();
        given == own
    }
}
