pub mod directory;
pub mod supabase;
