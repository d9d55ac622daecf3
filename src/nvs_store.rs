use anyhow::Result;
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};
use log::{info, warn};

use crate::platform::SettingsStore;

pub const NS: &str = "site";

const KEY_SITE_INDEX: &str = "index";
const KEY_FIRST_BOOT: &str = "first_boot";

/// Selected site and first-boot flag in the `site` NVS namespace.
pub struct NvsSettings {
    nvs: EspNvs<NvsDefault>,
}

impl NvsSettings {
    pub fn open(partition: EspDefaultNvsPartition) -> Result<Self> {
        let nvs = EspNvs::new(partition, NS, true)?;
        info!("NVS namespace {:?} opened", NS);
        Ok(Self { nvs })
    }
}

impl SettingsStore for NvsSettings {
    fn load_site_index(&mut self) -> Option<i64> {
        match self.nvs.get_i32(KEY_SITE_INDEX) {
            Ok(Some(v)) => {
                info!("NVS index = {}", v);
                Some(v as i64)
            }
            Ok(None) => {
                info!("No saved site index, using default");
                None
            }
            Err(e) => {
                warn!("NVS index read failed: {}", e);
                None
            }
        }
    }

    fn save_site_index(&mut self, index: usize) -> Result<()> {
        self.nvs.set_i32(KEY_SITE_INDEX, index as i32)?;
        info!("NVS saved index={}", index);
        Ok(())
    }

    fn first_boot_done(&mut self) -> bool {
        let done = self.nvs.get_u8(KEY_FIRST_BOOT).unwrap_or(None).unwrap_or(0) != 0;
        info!("NVS first_boot done = {}", done);
        done
    }

    fn mark_first_boot_done(&mut self) -> Result<()> {
        self.nvs.set_u8(KEY_FIRST_BOOT, 1)?;
        info!("NVS saved first_boot=1");
        Ok(())
    }
}
