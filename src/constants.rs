/// Fixed values shared across the service.
/// Wire-visible strings live here so handlers and tests agree on them.

// Home base every distance is measured from
pub const DEFAULT_ORIGIN_ADDRESS: &str = "El Morro, Boca del Río, Veracruz, México";

// Google Routes API
pub const DEFAULT_ROUTES_URL: &str = "https://routes.googleapis.com/directions/v2:computeRoutes";
pub const ROUTES_API_KEY_HEADER: &str = "X-Goog-Api-Key";
pub const ROUTES_FIELD_MASK_HEADER: &str = "X-Goog-FieldMask";
/// The provider returns an empty payload unless a field mask is sent.
pub const ROUTES_FIELD_MASK: &str = "routes.distanceMeters";
pub const TRAVEL_MODE_DRIVE: &str = "DRIVE";
pub const UNITS_METRIC: &str = "METRIC";

// Environment variables
pub const MAPS_API_KEY_ENV: &str = "GOOGLE_MAPS_API_KEY";
pub const SUPABASE_URL_ENV: &str = "SUPABASE_URL";
pub const SUPABASE_PROJECT_REF_ENV: &str = "SUPABASE_PROJECT_REF";
pub const SUPABASE_ANON_KEY_ENV: &str = "SUPABASE_ANON_KEY";
pub const CONFIG_PATH_ENV: &str = "SHOWS_CONFIG";
pub const PORT_ENV: &str = "PORT";
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

// Distance endpoint error messages
pub const MSG_MISSING_CREDENTIAL: &str = "Falta GOOGLE_MAPS_API_KEY en .env.local";
pub const MSG_MISSING_DESTINATION: &str = "Manda destinationPlaceId o destinationAddress";
pub const MSG_ROUTES_API_ERROR: &str = "Google Routes API error";
pub const MSG_MISSING_DISTANCE: &str = "No llegó distanceMeters";
pub const MSG_SERVER_ERROR: &str = "Server error";

// Backend collections
pub const SHOWS_TABLE: &str = "shows";
pub const SHOWS_PUBLIC_VIEW: &str = "shows_public";
pub const PROFILES_TABLE: &str = "profiles";

/// Columns every role may read.
pub const SHOW_PUBLIC_COLUMNS: &str = "id,created_at,show_date,artist,show_type,event_name,venue_name,address_text,maps_place_id,maps_lat,maps_lng,km_distance,hospitality,hotel_name,rooms_count,closed_date,notes";
/// Money columns, only present on the `shows` table.
pub const SHOW_MONEY_COLUMNS: &str = "show_cost,advance_paid,viaticos_cobrados";
pub const PROFILE_COLUMNS: &str = "role,full_name,artist_scope";

// Dashboard
pub const DASHBOARD_UPCOMING_LIMIT: usize = 8;

// Form validation
pub const MIN_EVENT_NAME_LEN: usize = 2;
