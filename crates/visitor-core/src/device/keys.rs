//! Device, browser, and operating-system attribute keys.

use crate::record::attribute_vocabulary;

attribute_vocabulary! {
    /// Raw user-agent string the record was built from.
    USER_AGENT => user_agent, set_user_agent;
    /// Form factor, e.g. `smartphone`, `desktop`, `tablet`.
    DEVICE_TYPE => device_type, set_device_type;
    DEVICE_BRAND => device_brand, set_device_brand;
    DEVICE_MODEL => device_model, set_device_model;
    BROWSER_NAME => browser_name, set_browser_name;
    BROWSER_SHORT_NAME => browser_short_name, set_browser_short_name;
    BROWSER_VERSION => browser_version, set_browser_version;
    BROWSER_ENGINE => browser_engine, set_browser_engine;
    BROWSER_ENGINE_VERSION => browser_engine_version, set_browser_engine_version;
    OS_NAME => os_name, set_os_name;
    OS_SHORT_NAME => os_short_name, set_os_short_name;
    OS_VERSION => os_version, set_os_version;
    OS_PLATFORM => os_platform, set_os_platform;
}
