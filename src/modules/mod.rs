pub mod race_api;
pub mod tables;

pub mod models {
    pub mod driver;
    pub mod event;
    pub mod race_result;
    pub mod stint;
    pub mod timing;

    pub mod general;
}

pub mod helpers {
    pub mod general;
    pub mod logging;
    pub mod math;
    pub mod timing;
}
