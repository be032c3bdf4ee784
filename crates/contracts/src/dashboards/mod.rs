pub mod d400_program_results;
