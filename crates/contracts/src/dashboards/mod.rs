pub mod d410_business_overview;
