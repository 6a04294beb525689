mod concern_dto;

pub use concern_dto::{
    ConcernListItemDto, ConcernResponseDto, ReportConcernDto, ReportConcernResponseDto,
    ResolveConcernDto,
};
