mod assignability;
mod member_lookup;
