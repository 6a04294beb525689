pub mod concern_handler;

pub use concern_handler::{
    __path_get_concern, __path_list_concerns, __path_report_concern, __path_resolve_concern,
    get_concern, list_concerns, report_concern, resolve_concern,
};
