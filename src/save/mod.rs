//! セーブ/ロード機能。
//!
//! 永続化されている全キーを1つのバージョン付きスナップショットにまとめ、
//! テキスト (JSON) としてエクスポート/インポートする。
//! 各キーは個別に保存されているので、スナップショットは読み取り時に組み立てる。

pub mod starter;

use std::collections::BTreeMap;

use rand::Rng;
use serde::de::{DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::abilities::ActiveEffect;
use crate::bank::{Account, Transaction, Wallet};
use crate::clicker::GoldenClick;
use crate::collection::DEFAULT_SKIN;
use crate::config::GameConfig;
use crate::error::{GameError, GameResult, StorageError};
use crate::inventory::InventoryItem;
use crate::ledger::{floor_amount, GUEST_ACCOUNT};
use crate::storage::{keys, Storage, Store};
use crate::time::Millis;

pub use starter::grant_starter_items_if_empty;

/// 現在のセーブフォーマットのバージョン。
/// フィールド追加のみならマイナーを上げる（`#[serde(default)]` で旧データを読める）。
pub const SAVE_VERSION: &str = "1.1.0";

/// 互換性のある最小メジャーバージョン。これ未満は拒否する。
const MIN_COMPATIBLE_MAJOR: u64 = 1;

/// 数値であることが必須のフィールド。
const REQUIRED_NUMERIC: &[&str] = &["balance"];

/// 全状態のスナップショット。エクスポートファイルの形式そのもの。
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SaveSnapshot {
    pub version: String,
    pub last_saved: Millis,

    // クリッカー
    pub clicker_coins: u64,
    pub clicker_level: u64,
    pub clicker_power: u64,
    pub clicker_total_clicks: u64,
    pub clicker_play_time: u64,
    pub clicker_skin: String,
    pub clicker_achievements: Vec<String>,
    pub clicker_critical: u64,
    pub clicker_speed: u64,
    pub clicker_abilities_used: u64,
    pub clicker_owned_skins: Vec<String>,
    pub clicker_owned_abilities: Vec<String>,
    pub clicker_active_abilities: BTreeMap<String, ActiveEffect>,
    pub clicker_ability_cooldowns: BTreeMap<String, Millis>,
    pub clicker_tutorial_completed: bool,
    pub clicker_last_golden_click: Option<GoldenClick>,
    pub clicker_daily_coins: u64,
    pub clicker_last_daily_reset: Millis,

    // ケース
    pub daily_case_openings: BTreeMap<String, u32>,
    /// ケース開封回数の日付 (UTC 日番号)。
    #[serde(deserialize_with = "case_day")]
    pub last_daily_reset: Option<u64>,
    pub flow_plus_owned: bool,
    pub account_verified: bool,

    // ゲストアカウントの資源
    pub gems: u64,
    pub balance: u64,
    pub inventory: Vec<InventoryItem>,
    pub last_card_time: Millis,

    pub bank: BankSave,
}

impl Default for SaveSnapshot {
    fn default() -> Self {
        Self {
            version: SAVE_VERSION.to_string(),
            last_saved: 0,
            clicker_coins: 0,
            clicker_level: 1,
            clicker_power: 1,
            clicker_total_clicks: 0,
            clicker_play_time: 0,
            clicker_skin: DEFAULT_SKIN.to_string(),
            clicker_achievements: Vec::new(),
            clicker_critical: 0,
            clicker_speed: 0,
            clicker_abilities_used: 0,
            clicker_owned_skins: vec![DEFAULT_SKIN.to_string()],
            clicker_owned_abilities: Vec::new(),
            clicker_active_abilities: BTreeMap::new(),
            clicker_ability_cooldowns: BTreeMap::new(),
            clicker_tutorial_completed: false,
            clicker_last_golden_click: None,
            clicker_daily_coins: 0,
            clicker_last_daily_reset: 0,
            daily_case_openings: BTreeMap::new(),
            last_daily_reset: None,
            flow_plus_owned: false,
            account_verified: false,
            gems: 0,
            balance: 0,
            inventory: Vec::new(),
            last_card_time: 0,
            bank: BankSave::default(),
        }
    }
}

/// 1.0.0 のセーブでは `lastDailyReset` が日付文字列 (既定値は `""`) だった。
/// 数値以外は未設定として扱う。
fn case_day<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
    Ok(Value::deserialize(deserializer)?.as_u64())
}

/// 銀行データ。ゲスト残高はトップレベルの `balance` に入るのでここには含めない。
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BankSave {
    pub accounts: Vec<Account>,
    pub balances: BTreeMap<String, u64>,
    pub wallets: Vec<Wallet>,
    pub wallet_index: BTreeMap<String, String>,
    pub active_wallet_id: Option<String>,
    pub transactions: Vec<Transaction>,
}

/// 保存済みの全キーからスナップショットを組み立てる。
/// 壊れたキーはデフォルト値になるので失敗しない。
pub fn snapshot<S: Storage>(store: &Store<S>, now: Millis) -> SaveSnapshot {
    let d = SaveSnapshot::default();

    let mut gems: BTreeMap<String, u64> = store.read_or_default(keys::GEMS);
    let mut balances: BTreeMap<String, u64> = store.read_or_default(keys::BALANCES);
    let mut inventory: BTreeMap<String, Vec<InventoryItem>> =
        store.read_or_default(keys::INVENTORY);
    let balance = balances.remove(GUEST_ACCOUNT).unwrap_or(0);

    SaveSnapshot {
        version: SAVE_VERSION.to_string(),
        last_saved: now,
        clicker_coins: store.read(keys::COINS, d.clicker_coins),
        clicker_level: store.read(keys::LEVEL, d.clicker_level),
        clicker_power: store.read(keys::POWER, d.clicker_power),
        clicker_total_clicks: store.read(keys::TOTAL_CLICKS, d.clicker_total_clicks),
        clicker_play_time: store.read(keys::PLAY_TIME, d.clicker_play_time),
        clicker_skin: store.read(keys::SKIN, d.clicker_skin),
        clicker_achievements: store.read_or_default(keys::ACHIEVEMENTS),
        clicker_critical: store.read(keys::CRITICAL, d.clicker_critical),
        clicker_speed: store.read(keys::SPEED, d.clicker_speed),
        clicker_abilities_used: store.read(keys::ABILITIES_USED, d.clicker_abilities_used),
        clicker_owned_skins: store.read(keys::OWNED_SKINS, d.clicker_owned_skins),
        clicker_owned_abilities: store.read_or_default(keys::OWNED_ABILITIES),
        clicker_active_abilities: store.read_or_default(keys::ACTIVE_ABILITIES),
        clicker_ability_cooldowns: store.read_or_default(keys::ABILITY_COOLDOWNS),
        clicker_tutorial_completed: store.read(keys::TUTORIAL_COMPLETED, false),
        clicker_last_golden_click: store.read(keys::LAST_GOLDEN_CLICK, None),
        clicker_daily_coins: store.read(keys::DAILY_COINS, 0),
        clicker_last_daily_reset: store.read(keys::LAST_DAILY_RESET, 0),
        daily_case_openings: store.read_or_default(keys::DAILY_CASE_OPENINGS),
        last_daily_reset: store.read(keys::CASE_OPENINGS_DAY, None),
        flow_plus_owned: store.read(keys::FLOW_PLUS, false),
        account_verified: store.read(keys::VERIFIED, false),
        gems: gems.remove(GUEST_ACCOUNT).unwrap_or(0),
        balance,
        inventory: inventory.remove(GUEST_ACCOUNT).unwrap_or_default(),
        last_card_time: store.read(keys::LAST_CARD_TIME, 0),
        bank: BankSave {
            accounts: store.read_or_default(keys::ACCOUNTS),
            balances,
            wallets: store.read_or_default(keys::WALLETS),
            wallet_index: store.read_or_default(keys::WALLET_INDEX),
            active_wallet_id: store.read(keys::ACTIVE_WALLET, None),
            transactions: store.read_or_default(keys::TRANSACTIONS),
        },
    }
}

/// バージョン文字列のメジャー部分。
fn version_major(version: &str) -> Option<u64> {
    version.trim().split('.').next()?.parse().ok()
}

fn check_version(version: &str) -> GameResult<()> {
    if version.trim().is_empty() {
        return Err(GameError::InvalidFormat("missing version".to_string()));
    }
    match version_major(version) {
        Some(major) if major >= MIN_COMPATIBLE_MAJOR => Ok(()),
        _ => Err(GameError::InvalidFormat(format!(
            "unsupported save version {version}"
        ))),
    }
}

/// インポート前の検証。状態には一切触れない。
fn validate(value: &Value) -> GameResult<()> {
    let version = value
        .get("version")
        .and_then(Value::as_str)
        .ok_or_else(|| GameError::InvalidFormat("missing version".to_string()))?;
    check_version(version)?;
    for field in REQUIRED_NUMERIC {
        if !value.get(*field).is_some_and(Value::is_number) {
            return Err(GameError::InvalidFormat(format!("{field} must be a number")));
        }
    }
    Ok(())
}

fn invalid(e: serde_json::Error) -> GameError {
    GameError::InvalidFormat(e.to_string())
}

/// `input` の各フィールドを `defaults` に重ねる。
/// 型が合わないフィールドと未知のフィールドは無視し、デフォルト値のまま残す。
fn merge_lenient<T: Serialize + DeserializeOwned>(
    defaults: &T,
    input: Map<String, Value>,
) -> GameResult<T> {
    let mut merged = match serde_json::to_value(defaults).map_err(invalid)? {
        Value::Object(map) => map,
        _ => return Err(GameError::InvalidFormat("expected an object".to_string())),
    };
    for (field, value) in input {
        let Some(previous) = merged.insert(field.clone(), value) else {
            merged.remove(&field);
            continue;
        };
        if serde_json::from_value::<T>(Value::Object(merged.clone())).is_err() {
            tracing::warn!(field = %field, "mistyped field in save data, using default");
            merged.insert(field, previous);
        }
    }
    serde_json::from_value(Value::Object(merged)).map_err(invalid)
}

/// エクスポートテキストを検証付きでパースする。
///
/// 拒否するのはバージョンが無い/非互換の場合と、`balance` が数値でない場合のみ。
/// それ以外の型違いはフィールド単位でデフォルト値に戻す。
pub fn parse(text: &str) -> GameResult<SaveSnapshot> {
    let value: Value = serde_json::from_str(text).map_err(invalid)?;
    validate(&value)?;
    let Value::Object(mut fields) = value else {
        return Err(GameError::InvalidFormat("expected an object".to_string()));
    };

    // 必須の数値は整数に切り捨てる (負数は 0)。
    for field in REQUIRED_NUMERIC {
        if let Some(n) = fields.get(*field).and_then(Value::as_f64) {
            fields.insert((*field).to_string(), Value::from(floor_amount(n)));
        }
    }
    if let Some(Value::Object(bank)) = fields.remove("bank") {
        let bank = merge_lenient(&BankSave::default(), bank)?;
        fields.insert("bank".to_string(), serde_json::to_value(bank).map_err(invalid)?);
    }

    let snapshot = merge_lenient(&SaveSnapshot::default(), fields)?;
    if snapshot.version.as_str() != SAVE_VERSION {
        tracing::info!(
            saved = %snapshot.version,
            current = SAVE_VERSION,
            "migrating save data from an older version"
        );
    }
    Ok(snapshot)
}

fn write_optional<S: Storage, T: Serialize>(
    store: &Store<S>,
    key: &str,
    value: &Option<T>,
) -> Result<(), StorageError> {
    match value {
        Some(v) => store.write(key, v),
        None => {
            store.remove(key);
            Ok(())
        }
    }
}

/// スナップショットの内容で全キーを上書きする。
pub fn restore<S: Storage>(store: &Store<S>, data: &SaveSnapshot) -> GameResult<()> {
    check_version(&data.version)?;

    // 途中で書き込みに失敗したら全キーを元に戻す。
    store.atomically(keys::ALL, |store| {
        store.write(keys::COINS, &data.clicker_coins)?;
        store.write(keys::LEVEL, &data.clicker_level)?;
        store.write(keys::POWER, &data.clicker_power)?;
        store.write(keys::TOTAL_CLICKS, &data.clicker_total_clicks)?;
        store.write(keys::PLAY_TIME, &data.clicker_play_time)?;
        store.write(keys::SKIN, &data.clicker_skin)?;
        store.write(keys::ACHIEVEMENTS, &data.clicker_achievements)?;
        store.write(keys::CRITICAL, &data.clicker_critical)?;
        store.write(keys::SPEED, &data.clicker_speed)?;
        store.write(keys::ABILITIES_USED, &data.clicker_abilities_used)?;
        store.write(keys::OWNED_SKINS, &data.clicker_owned_skins)?;
        store.write(keys::OWNED_ABILITIES, &data.clicker_owned_abilities)?;
        store.write(keys::ACTIVE_ABILITIES, &data.clicker_active_abilities)?;
        store.write(keys::ABILITY_COOLDOWNS, &data.clicker_ability_cooldowns)?;
        store.write(keys::TUTORIAL_COMPLETED, &data.clicker_tutorial_completed)?;
        write_optional(store, keys::LAST_GOLDEN_CLICK, &data.clicker_last_golden_click)?;
        store.write(keys::DAILY_COINS, &data.clicker_daily_coins)?;
        store.write(keys::LAST_DAILY_RESET, &data.clicker_last_daily_reset)?;

        store.write(keys::DAILY_CASE_OPENINGS, &data.daily_case_openings)?;
        write_optional(store, keys::CASE_OPENINGS_DAY, &data.last_daily_reset)?;
        store.write(keys::FLOW_PLUS, &data.flow_plus_owned)?;
        store.write(keys::VERIFIED, &data.account_verified)?;

        let guest = GUEST_ACCOUNT.to_string();
        store.write(keys::GEMS, &BTreeMap::from([(guest.clone(), data.gems)]))?;
        let mut balances = data.bank.balances.clone();
        balances.insert(guest.clone(), data.balance);
        store.write(keys::BALANCES, &balances)?;
        store.write(
            keys::INVENTORY,
            &BTreeMap::from([(guest, data.inventory.clone())]),
        )?;
        store.write(keys::LAST_CARD_TIME, &data.last_card_time)?;

        store.write(keys::ACCOUNTS, &data.bank.accounts)?;
        store.write(keys::WALLETS, &data.bank.wallets)?;
        store.write(keys::WALLET_INDEX, &data.bank.wallet_index)?;
        write_optional(store, keys::ACTIVE_WALLET, &data.bank.active_wallet_id)?;
        store.write(keys::TRANSACTIONS, &data.bank.transactions)?;

        store.write(keys::SAVE_DATA, data)
    })?;
    tracing::info!(version = %data.version, "save data restored");
    Ok(())
}

/// 整形済み JSON としてエクスポートする。
pub fn export_text<S: Storage>(store: &Store<S>, now: Millis) -> GameResult<String> {
    let data = snapshot(store, now);
    serde_json::to_string_pretty(&data).map_err(|e| {
        GameError::Storage(StorageError::Encode {
            key: keys::SAVE_DATA.to_string(),
            reason: e.to_string(),
        })
    })
}

/// テキストをインポートする。検証に失敗した場合は状態を変更しない。
pub fn import_text<S: Storage>(store: &Store<S>, text: &str) -> GameResult<SaveSnapshot> {
    let data = match parse(text) {
        Ok(d) => d,
        Err(e) => {
            tracing::warn!(error = %e, "rejected save import");
            return Err(e);
        }
    };
    restore(store, &data)?;
    Ok(data)
}

/// 集約キーにスナップショットを書き出す (オートセーブ)。
pub fn persist<S: Storage>(store: &Store<S>, now: Millis) -> GameResult<SaveSnapshot> {
    let data = snapshot(store, now);
    store.write(keys::SAVE_DATA, &data)?;
    tracing::debug!(now, "autosaved");
    Ok(data)
}

/// ゲームデータを削除し、初期アイテムを付与し直す。
/// 口座・ウォレット・取引履歴・セッションは残す (残高はすべて消える)。
pub fn reset_all<S: Storage, R: Rng + ?Sized>(
    store: &Store<S>,
    config: &GameConfig,
    now: Millis,
    rng: &mut R,
) -> GameResult<()> {
    for key in keys::ALL.iter().filter(|key| !keys::BANK.contains(*key)) {
        store.remove(key);
    }
    tracing::info!("all game data cleared");
    grant_starter_items_if_empty(store, config, now, rng)?;
    Ok(())
}
