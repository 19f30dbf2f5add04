//! # Códigos de Estado HTTP
//!
//! Códigos de estado que puede emitir el servidor de archivos:
//!
//! - **2xx**: Éxito (200 OK)
//! - **3xx**: Redirección a un path normalizado (301)
//! - **4xx**: Error del cliente (400, 404, 405, 429)
//! - **5xx**: Error del servidor (500)

/// Representa los códigos de estado HTTP que soporta nuestro servidor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK - La petición fue exitosa
    Ok = 200,

    /// 301 Moved Permanently - El path no estaba normalizado
    MovedPermanently = 301,

    /// 400 Bad Request - Request malformado
    BadRequest = 400,

    /// 404 Not Found - Archivo o directorio no encontrado
    NotFound = 404,

    /// 405 Method Not Allowed - Solo se sirve GET
    MethodNotAllowed = 405,

    /// 429 Too Many Requests - Rate limiting activado
    TooManyRequests = 429,

    /// 500 Internal Server Error - Error leyendo un archivo existente
    InternalServerError = 500,
}

impl StatusCode {
    /// Convierte el código a su valor numérico
    ///
    /// # Ejemplo
    /// ```
    /// use file_server::http::StatusCode;
    /// assert_eq!(StatusCode::TooManyRequests.as_u16(), 429);
    /// ```
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// Retorna el texto de razón (reason phrase) asociado al código
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::MovedPermanently => "Moved Permanently",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::TooManyRequests => "Too Many Requests",
            StatusCode::InternalServerError => "Internal Server Error",
        }
    }

    /// Verifica si el código indica error del servidor (5xx)
    pub fn is_server_error(&self) -> bool {
        (500..600).contains(&self.as_u16())
    }
}

impl std::fmt::Display for StatusCode {
    /// Formato: "200 OK"
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
