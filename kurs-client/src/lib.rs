mod comment;
pub use comment::{flatten, CommentData};

mod comments;
pub use comments::{CommentsAction, CommentsState};

mod conversion;
pub use conversion::{compute_conversion, Amount, ConversionRow, Mode};

mod converter;
pub use converter::{load_rows, Converter, ConverterAction, ConverterState, Side};

mod notice;
pub use notice::Notice;

mod optimistic;
pub use optimistic::UndoToken;

mod posts;
pub use posts::{PostData, PostsState};

mod profile;
pub use profile::ExchangeProfile;

mod rates;
pub use rates::RateTable;

pub mod storage;

mod thread;
pub use thread::{CommentThread, Created, Deleted};

pub mod api {
    pub use kurs_api::*;
}
