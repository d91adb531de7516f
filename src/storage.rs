//! Flash-backed settings and screenshots.
//!
//! Uses the external QSPI NOR flash through `sequential-storage`:
//!
//!   - a key-value map (`SETTINGS_FLASH_START..SETTINGS_FLASH_END`) holding
//!     the encoded `DisplaySettings` record and the capture counter;
//!   - a queue (`CAPTURE_FLASH_START..CAPTURE_FLASH_END`) of capture
//!     records. When it is full the oldest captures are overwritten.
//!
//! Both halves share one flash device behind an async mutex, so the
//! settings store and the capture sink can be handed to `Camera` separately.

use core::ops::Range;

use defmt::{debug, error, info, warn};
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::mutex::Mutex;
use embedded_storage_async::nor_flash::NorFlash;
use sequential_storage::cache::NoCache;
use sequential_storage::{map, queue};

use crate::capture::{encode_capture, CaptureSink, MAX_CAPTURE_LEN};
use crate::config::{
    CAPTURE_FLASH_END, CAPTURE_FLASH_START, SETTINGS_FLASH_END, SETTINGS_FLASH_START,
};
use crate::error::Error;
use crate::frame::{Frame, FrameStats};
use crate::settings::{self, DisplaySettings, SettingsStore, RECORD_LEN};

const SETTINGS_RANGE: Range<u32> = SETTINGS_FLASH_START..SETTINGS_FLASH_END;
const CAPTURE_RANGE: Range<u32> = CAPTURE_FLASH_START..CAPTURE_FLASH_END;

/// Map key of the settings record.
const KEY_SETTINGS: u8 = 0x01;

/// Map key of the last capture sequence number.
const KEY_CAPTURE_SEQ: u8 = 0x02;

/// Scratch space for map operations: one record plus item header.
const MAP_BUF_LEN: usize = 64;

/// Flash device shared by the two stores.
pub type SharedFlash<F> = Mutex<CriticalSectionRawMutex, F>;

/// `SettingsStore` over the settings map.
pub struct FlashSettings<F: NorFlash + 'static> {
    flash: &'static SharedFlash<F>,
}

impl<F: NorFlash + 'static> FlashSettings<F> {
    pub fn new(flash: &'static SharedFlash<F>) -> Self {
        Self { flash }
    }
}

impl<F: NorFlash + 'static> SettingsStore for FlashSettings<F> {
    async fn load(&mut self) -> Result<Option<DisplaySettings>, Error> {
        let mut flash = self.flash.lock().await;
        let mut buf = [0u8; MAP_BUF_LEN];

        match map::fetch_item::<u8, &[u8], _>(
            &mut *flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut buf,
            &KEY_SETTINGS,
        )
        .await
        {
            Ok(Some(data)) => match settings::decode(data) {
                Ok(s) => {
                    info!("Settings: loaded from flash");
                    Ok(Some(s))
                }
                Err(e) => {
                    warn!("Settings: stored record rejected: {:?}", e);
                    Err(e.into())
                }
            },
            Ok(None) => {
                info!("Settings: nothing stored");
                Ok(None)
            }
            Err(e) => {
                error!("Settings: flash read error: {:?}", defmt::Debug2Format(&e));
                Err(Error::Storage)
            }
        }
    }

    async fn save(&mut self, s: &DisplaySettings) -> Result<(), Error> {
        let record: [u8; RECORD_LEN] = settings::encode(s);
        let item: &[u8] = &record;
        let mut flash = self.flash.lock().await;
        let mut buf = [0u8; MAP_BUF_LEN];

        match map::store_item::<u8, &[u8], _>(
            &mut *flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut buf,
            &KEY_SETTINGS,
            &item,
        )
        .await
        {
            Ok(()) => {
                debug!("Settings: saved");
                Ok(())
            }
            Err(e) => {
                error!("Settings: flash write error: {:?}", defmt::Debug2Format(&e));
                Err(Error::Storage)
            }
        }
    }
}

/// `CaptureSink` appending to the capture queue.
pub struct FlashCaptures<F: NorFlash + 'static> {
    flash: &'static SharedFlash<F>,
    last_seq: u32,
}

impl<F: NorFlash + 'static> FlashCaptures<F> {
    /// Pick up the capture counter where the previous boot left it.
    pub async fn open(flash: &'static SharedFlash<F>) -> Self {
        let mut buf = [0u8; MAP_BUF_LEN];
        let last_seq = {
            let mut guard = flash.lock().await;
            match map::fetch_item::<u8, u32, _>(
                &mut *guard,
                SETTINGS_RANGE,
                &mut NoCache::new(),
                &mut buf,
                &KEY_CAPTURE_SEQ,
            )
            .await
            {
                Ok(seq) => seq.unwrap_or(0),
                Err(e) => {
                    warn!("Capture: counter unreadable: {:?}", defmt::Debug2Format(&e));
                    0
                }
            }
        };
        info!("Capture: {} screenshots taken so far", last_seq);
        Self { flash, last_seq }
    }
}

impl<F: NorFlash + 'static> CaptureSink for FlashCaptures<F> {
    async fn save_screenshot(
        &mut self,
        frame: &Frame,
        stats: &FrameStats,
        bit_depth: u8,
    ) -> Result<u32, Error> {
        let mut record = [0u8; MAX_CAPTURE_LEN];
        let len = encode_capture(frame, stats, bit_depth, &mut record)?;

        let mut flash = self.flash.lock().await;
        if let Err(e) = queue::push(
            &mut *flash,
            CAPTURE_RANGE,
            &mut NoCache::new(),
            &record[..len],
            true,
        )
        .await
        {
            error!("Capture: flash write error: {:?}", defmt::Debug2Format(&e));
            return Err(Error::Capture);
        }

        let seq = self.last_seq + 1;
        self.last_seq = seq;

        let mut buf = [0u8; MAP_BUF_LEN];
        if let Err(e) = map::store_item::<u8, u32, _>(
            &mut *flash,
            SETTINGS_RANGE,
            &mut NoCache::new(),
            &mut buf,
            &KEY_CAPTURE_SEQ,
            &seq,
        )
        .await
        {
            // The capture itself is stored; only the numbering may repeat.
            warn!("Capture: counter not saved: {:?}", defmt::Debug2Format(&e));
        }

        info!("Capture: #{} saved ({} bytes)", seq, len);
        Ok(seq)
    }
}
